//! RPC method names

/// All RPC method names. These are the query and mutation field names and
/// must not change.
pub mod method_names {
    // User queries
    pub const USERS: &str = "users";
    pub const ADMINS: &str = "admins";
    pub const USER: &str = "user";

    // Project queries
    pub const PROJECTS: &str = "projects";
    pub const PROJECT: &str = "project";
    pub const PROJECTS_BY_ADMIN: &str = "projectsByAdmin";

    // Task queries
    pub const TASKS: &str = "tasks";
    pub const TASK: &str = "task";
    pub const TASKS_BY_ADMIN: &str = "tasksByAdmin";
    pub const ADMIN_TASKS: &str = "adminTasks";

    // Aggregate counts
    pub const NUMBER_OF_STUDENTS: &str = "numberOfStudents";
    pub const NUMBER_OF_PROJECTS: &str = "numberOfProjects";
    pub const NUMBER_OF_TASKS: &str = "numberOfTasks";
    pub const NUMBER_OF_FINISHED_PROJECTS: &str = "numberOfFinishedProjects";

    // Message queries
    pub const MESSAGES: &str = "messages";
    pub const RECEIVED_MESSAGES: &str = "receivedMessages";

    // Mutations
    pub const CREATE_USER: &str = "createUser";
    pub const UPDATE_USER: &str = "updateUser";
    pub const LOGIN: &str = "login";
    pub const CREATE_PROJECT: &str = "createProject";
    pub const UPDATE_PROJECT: &str = "updateProject";
    pub const CREATE_TASK: &str = "createTask";
    pub const UPDATE_TASK: &str = "updateTask";
    pub const SEND_MESSAGE: &str = "sendMessage";
}

/// Methods callable without a session token even when authentication is
/// required.
pub const PUBLIC_METHODS: &[&str] = &[method_names::LOGIN, method_names::CREATE_USER];

/// Returns true if `method` may be called without a session token.
pub fn is_public_method(method: &str) -> bool {
    PUBLIC_METHODS.contains(&method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_methods() {
        assert!(is_public_method("login"));
        assert!(is_public_method("createUser"));
        assert!(!is_public_method("sendMessage"));
        assert!(!is_public_method("users"));
    }
}
