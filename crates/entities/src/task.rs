//! Task entity definitions.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::WorkStatus;

/// A unit of work inside a project, assigned to students.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: Uuid,
    /// Parent project.
    pub project_id: Uuid,
    /// Task name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Current status.
    #[serde(default)]
    pub status: WorkStatus,
    /// When the task is due.
    pub due_date: DateTime<Utc>,
    /// Ids of the students assigned to this task.
    pub assigned_students: Vec<Uuid>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new pending task.
    pub fn new(project_id: Uuid, name: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            name: name.into(),
            description: String::new(),
            status: WorkStatus::default(),
            due_date,
            assigned_students: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: WorkStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the assigned students.
    pub fn with_assigned_students(mut self, students: Vec<Uuid>) -> Self {
        self.assigned_students = students;
        self
    }

    /// Returns true if the given student is assigned to this task.
    pub fn is_assigned(&self, student_id: Uuid) -> bool {
        self.assigned_students.contains(&student_id)
    }

    /// Due date rendered as an RFC 3339 timestamp with milliseconds.
    pub fn due_date_string(&self) -> String {
        self.due_date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
