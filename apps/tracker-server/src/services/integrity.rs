//! Cross-entity integrity checks run before every project, task, user and
//! chat message write.
//!
//! Every check is read-only. Referenced ids are examined in input order and
//! the first violation is returned, so the error always names the offending
//! reference. Callers abort the whole write on any error.

use std::collections::HashSet;

use entities::{ChatMessage, Project, Role, Task, User};
use entity_store::{EntityStore, ProjectFilter, StoreError, TaskFilter};
use uuid::Uuid;

/// A rejected write.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A required field is missing or the request is malformed.
    #[error("{0}")]
    BadRequest(String),

    /// A referenced id or name does not resolve.
    #[error("{entity} {reference} not found")]
    ReferenceNotFound {
        entity: &'static str,
        reference: String,
    },

    /// A referenced user has the wrong role for the relationship.
    #[error("{0}")]
    RoleMismatch(String),

    /// The name is already used by another user.
    #[error("Name '{0}' is already taken")]
    DuplicateName(String),

    /// The university id is already used by another student.
    #[error("University id {0} is already registered to another student")]
    DuplicateUniversityId(i64),

    /// The end date is not after the start date.
    #[error("End date must be after start date")]
    DateRangeInvalid,

    /// The store failed while checking.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ValidationError {
    fn missing(field: &str) -> Self {
        Self::BadRequest(format!("{field} is required"))
    }

    fn reference(entity: &'static str, reference: impl ToString) -> Self {
        Self::ReferenceNotFound {
            entity,
            reference: reference.to_string(),
        }
    }
}

/// Result type for integrity checks.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks candidate writes against the current contents of a store.
pub struct IntegrityValidator<'a, S: EntityStore> {
    store: &'a S,
}

impl<'a, S: EntityStore> IntegrityValidator<'a, S> {
    /// Creates a validator reading from `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Checks a project about to be created or replaced.
    pub async fn validate_project_write(&self, project: &Project) -> ValidationResult<()> {
        require_text("Project title", &project.title)?;
        require_text("Project description", &project.description)?;
        require_text("Category", &project.category)?;
        require_text("Admin name", &project.admin_name)?;

        if !project.has_valid_date_range() {
            return Err(ValidationError::DateRangeInvalid);
        }

        self.check_students(&project.assigned_students, false).await?;

        let admin = self
            .store
            .find_user_by_name(&project.admin_name)
            .await?
            .ok_or_else(|| ValidationError::reference("Admin", &project.admin_name))?;
        if !admin.role.is_admin() {
            return Err(ValidationError::RoleMismatch(format!(
                "User '{}' is not an admin",
                admin.name
            )));
        }

        Ok(())
    }

    /// Checks a task about to be created or replaced.
    pub async fn validate_task_write(&self, task: &Task) -> ValidationResult<()> {
        require_text("Task name", &task.name)?;
        require_text("Description", &task.description)?;

        if self.store.get_project(task.project_id).await?.is_none() {
            return Err(ValidationError::reference("Project", task.project_id));
        }

        self.check_students(&task.assigned_students, true).await
    }

    /// Checks a user about to be created (`is_update == false`) or replaced.
    ///
    /// On update the user's own record is excluded from the uniqueness
    /// checks.
    pub async fn validate_user_write(&self, user: &User, is_update: bool) -> ValidationResult<()> {
        require_text("Name", &user.name)?;
        let own_id = is_update.then_some(user.id);

        if let Some(other) = self.store.find_user_by_name(&user.name).await? {
            if Some(other.id) != own_id {
                return Err(ValidationError::DuplicateName(user.name.clone()));
            }
        }

        if let Role::Student { university_id } = user.role {
            if let Some(other) = self
                .store
                .find_student_by_university_id(university_id)
                .await?
            {
                if Some(other.id) != own_id {
                    return Err(ValidationError::DuplicateUniversityId(university_id));
                }
            }
        }

        Ok(())
    }

    /// Checks that replacing `current` with `updated` keeps every project and
    /// task reference valid.
    ///
    /// A student still assigned somewhere cannot become an admin. An admin
    /// owning projects can neither become a student nor change name, since
    /// projects refer to their admin by name.
    pub async fn validate_user_transition(
        &self,
        current: &User,
        updated: &User,
    ) -> ValidationResult<()> {
        match (current.role, updated.role) {
            (Role::Student { .. }, Role::Admin) => {
                let filter = ProjectFilter {
                    assigned_student: Some(current.id),
                    ..Default::default()
                };
                let projects = self.store.count_projects(filter).await?;
                let tasks = self
                    .store
                    .count_tasks(TaskFilter {
                        assigned_student: Some(current.id),
                        ..Default::default()
                    })
                    .await?;
                if projects > 0 || tasks > 0 {
                    return Err(ValidationError::RoleMismatch(format!(
                        "Student '{}' is assigned to {projects} project(s) and {tasks} task(s) and cannot become an admin",
                        current.name
                    )));
                }
            }
            (Role::Admin, updated_role) => {
                let owned = self
                    .store
                    .count_projects(ProjectFilter {
                        admin_name: Some(current.name.clone()),
                        ..Default::default()
                    })
                    .await?;
                if owned > 0 {
                    if updated_role.is_student() {
                        return Err(ValidationError::RoleMismatch(format!(
                            "Admin '{}' owns {owned} project(s) and cannot become a student",
                            current.name
                        )));
                    }
                    if updated.name != current.name {
                        return Err(ValidationError::BadRequest(format!(
                            "Admin '{}' owns {owned} project(s) and cannot be renamed",
                            current.name
                        )));
                    }
                }
            }
            (Role::Student { .. }, Role::Student { .. }) => {}
        }

        Ok(())
    }

    /// Checks a chat message and returns its resolved sender and receiver.
    pub async fn validate_message_write(
        &self,
        message: &ChatMessage,
    ) -> ValidationResult<(User, User)> {
        require_text("Message", &message.message)?;
        if message.sender_id == message.receiver_id {
            return Err(ValidationError::BadRequest(
                "Sender and receiver must be different users".to_string(),
            ));
        }

        let sender = self
            .store
            .get_user(message.sender_id)
            .await?
            .ok_or_else(|| ValidationError::reference("Sender", message.sender_id))?;
        let receiver = self
            .store
            .get_user(message.receiver_id)
            .await?
            .ok_or_else(|| ValidationError::reference("Receiver", message.receiver_id))?;

        Ok((sender, receiver))
    }

    /// Every id must resolve to a student. With `unique`, an id may also
    /// appear only once.
    async fn check_students(&self, ids: &[Uuid], unique: bool) -> ValidationResult<()> {
        if ids.is_empty() {
            return Err(ValidationError::BadRequest(
                "At least one student must be assigned".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) && unique {
                return Err(ValidationError::BadRequest(format!(
                    "Student {id} is assigned more than once"
                )));
            }

            let user = self
                .store
                .get_user(*id)
                .await?
                .ok_or_else(|| ValidationError::reference("Student", id))?;
            if !user.role.is_student() {
                return Err(ValidationError::RoleMismatch(format!(
                    "User {id} is not a student"
                )));
            }
        }

        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(())
}
