//! Entity store trait definitions.

use async_trait::async_trait;
use entities::{ChatMessage, Project, RoleKind, Task, User, WorkStatus};
use uuid::Uuid;

use crate::StoreResult;

/// Filter options for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Filter by role.
    pub role: Option<RoleKind>,
}

impl UserFilter {
    /// Matches users of the given role.
    pub fn role(role: RoleKind) -> Self {
        Self { role: Some(role) }
    }

    /// Returns true if the user passes this filter.
    pub fn matches(&self, user: &User) -> bool {
        self.role.is_none_or(|role| user.role.kind() == role)
    }
}

/// Filter options for listing projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Filter by owning admin name.
    pub admin_name: Option<String>,
    /// Filter by status.
    pub status: Option<WorkStatus>,
    /// Filter by assigned student.
    pub assigned_student: Option<Uuid>,
}

impl ProjectFilter {
    /// Returns true if the project passes this filter.
    pub fn matches(&self, project: &Project) -> bool {
        self.admin_name
            .as_deref()
            .is_none_or(|name| project.admin_name == name)
            && self.status.is_none_or(|status| project.status == status)
            && self
                .assigned_student
                .is_none_or(|student| project.is_assigned(student))
    }
}

/// Filter options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Only tasks belonging to one of these projects.
    pub project_ids: Option<Vec<Uuid>>,
    /// Filter by assigned student.
    pub assigned_student: Option<Uuid>,
}

impl TaskFilter {
    /// Matches tasks of a single project.
    pub fn project(project_id: Uuid) -> Self {
        Self {
            project_ids: Some(vec![project_id]),
            ..Default::default()
        }
    }

    /// Returns true if the task passes this filter.
    pub fn matches(&self, task: &Task) -> bool {
        self.project_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&task.project_id))
            && self
                .assigned_student
                .is_none_or(|student| task.is_assigned(student))
    }
}

/// Filter options for listing chat messages.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Messages exchanged between these two users, in either direction.
    pub between: Option<(Uuid, Uuid)>,
    /// Messages received by this user.
    pub receiver_id: Option<Uuid>,
}

impl MessageFilter {
    /// Matches the conversation between `a` and `b`.
    pub fn between(a: Uuid, b: Uuid) -> Self {
        Self {
            between: Some((a, b)),
            ..Default::default()
        }
    }

    /// Matches messages received by `receiver_id`.
    pub fn received_by(receiver_id: Uuid) -> Self {
        Self {
            receiver_id: Some(receiver_id),
            ..Default::default()
        }
    }

    /// Returns true if the message passes this filter.
    pub fn matches(&self, message: &ChatMessage) -> bool {
        self.between.is_none_or(|(a, b)| message.is_between(a, b))
            && self
                .receiver_id
                .is_none_or(|receiver| message.receiver_id == receiver)
    }
}

/// Trait for entity storage operations.
///
/// Listing methods return entities in store order, which is insertion order
/// for the bundled implementations. Updates replace the whole record
/// (last write wins).
#[async_trait]
pub trait EntityStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Gets the users that exist among `ids`, in input order.
    ///
    /// Missing ids are skipped and duplicate ids yield one entry each time
    /// they appear.
    async fn get_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    /// Gets a user by exact name.
    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>>;

    /// Gets the student holding the given university id.
    async fn find_student_by_university_id(&self, university_id: i64)
        -> StoreResult<Option<User>>;

    /// Lists users with optional filters.
    async fn list_users(&self, filter: UserFilter) -> StoreResult<Vec<User>>;

    /// Counts users matching the filter.
    async fn count_users(&self, filter: UserFilter) -> StoreResult<u64>;

    /// Updates a user.
    async fn update_user(&self, user: User) -> StoreResult<User>;

    // =========================================================================
    // Project operations
    // =========================================================================

    /// Creates a new project.
    async fn create_project(&self, project: Project) -> StoreResult<Project>;

    /// Gets a project by ID.
    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Lists projects with optional filters.
    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>>;

    /// Counts projects matching the filter.
    async fn count_projects(&self, filter: ProjectFilter) -> StoreResult<u64>;

    /// Updates a project.
    async fn update_project(&self, project: Project) -> StoreResult<Project>;

    // =========================================================================
    // Task operations
    // =========================================================================

    /// Creates a new task.
    async fn create_task(&self, task: Task) -> StoreResult<Task>;

    /// Gets a task by ID.
    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Lists tasks with optional filters.
    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>>;

    /// Counts tasks matching the filter.
    async fn count_tasks(&self, filter: TaskFilter) -> StoreResult<u64>;

    /// Updates a task.
    async fn update_task(&self, task: Task) -> StoreResult<Task>;

    // =========================================================================
    // Chat message operations
    // =========================================================================

    /// Appends a chat message.
    async fn create_message(&self, message: ChatMessage) -> StoreResult<ChatMessage>;

    /// Lists chat messages with optional filters.
    async fn list_messages(&self, filter: MessageFilter) -> StoreResult<Vec<ChatMessage>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use entities::User;

    #[test]
    fn test_user_filter() {
        let student = User::student("Sam", "hash", 1);
        let admin = User::admin("Dr.X", "hash");

        assert!(UserFilter::default().matches(&student));
        assert!(UserFilter::role(RoleKind::Student).matches(&student));
        assert!(!UserFilter::role(RoleKind::Student).matches(&admin));
    }

    #[test]
    fn test_project_filter() {
        let student = Uuid::new_v4();
        let now = Utc::now();
        let project = Project::new("P", "Dr.X", now, now + chrono::Duration::days(1))
            .with_status(WorkStatus::Completed)
            .with_assigned_students(vec![student]);

        let filter = ProjectFilter {
            admin_name: Some("Dr.X".into()),
            status: Some(WorkStatus::Completed),
            assigned_student: Some(student),
        };
        assert!(filter.matches(&project));

        let other_admin = ProjectFilter {
            admin_name: Some("Dr.Y".into()),
            ..Default::default()
        };
        assert!(!other_admin.matches(&project));
    }

    #[test]
    fn test_message_filter() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let message = ChatMessage::new(a, b, "hi");

        assert!(MessageFilter::between(b, a).matches(&message));
        assert!(MessageFilter::received_by(b).matches(&message));
        assert!(!MessageFilter::received_by(a).matches(&message));
    }
}
