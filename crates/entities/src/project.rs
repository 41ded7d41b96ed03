//! Project entity definitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::WorkStatus;

/// Date format used when rendering project dates.
pub const PROJECT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A project owned by an admin and worked on by students.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: Uuid,
    /// Project title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Start of the project.
    pub start_date: DateTime<Utc>,
    /// End of the project, strictly after `start_date`.
    pub end_date: DateTime<Utc>,
    /// Current status.
    #[serde(default)]
    pub status: WorkStatus,
    /// Ids of the students assigned to this project.
    pub assigned_students: Vec<Uuid>,
    /// Name of the owning admin.
    pub admin_name: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project with the default status and no students.
    pub fn new(
        title: impl Into<String>,
        admin_name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            start_date,
            end_date,
            status: WorkStatus::default(),
            assigned_students: Vec::new(),
            admin_name: admin_name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
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

    /// Returns true when the end date is strictly after the start date.
    pub fn has_valid_date_range(&self) -> bool {
        self.end_date > self.start_date
    }

    /// Returns true if the given student is assigned to this project.
    pub fn is_assigned(&self, student_id: Uuid) -> bool {
        self.assigned_students.contains(&student_id)
    }

    /// Start date rendered as `YYYY-MM-DD`.
    pub fn start_date_string(&self) -> String {
        self.start_date.format(PROJECT_DATE_FORMAT).to_string()
    }

    /// End date rendered as `YYYY-MM-DD`.
    pub fn end_date_string(&self) -> String {
        self.end_date.format(PROJECT_DATE_FORMAT).to_string()
    }
}

/// Returns midnight UTC of the given calendar date.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
