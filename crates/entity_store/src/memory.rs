//! In-memory entity store implementation.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use entities::{ChatMessage, Project, Task, User};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    EntityStore, MessageFilter, ProjectFilter, StoreError, StoreResult, TaskFilter, UserFilter,
};

/// Rows keyed by id, remembering insertion order.
#[derive(Debug)]
struct Table<T> {
    rows: HashMap<Uuid, T>,
    order: Vec<Uuid>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert(&mut self, entity_type: &'static str, id: Uuid, row: T) -> StoreResult<T> {
        if self.rows.contains_key(&id) {
            return Err(StoreError::already_exists(entity_type, id.to_string()));
        }
        self.rows.insert(id, row.clone());
        self.order.push(id);
        Ok(row)
    }

    fn replace(&mut self, entity_type: &'static str, id: Uuid, row: T) -> StoreResult<T> {
        match self.rows.get_mut(&id) {
            Some(slot) => {
                *slot = row.clone();
                Ok(row)
            }
            None => Err(StoreError::not_found(entity_type, id.to_string())),
        }
    }

    fn get(&self, id: &Uuid) -> Option<T> {
        self.rows.get(id).cloned()
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }
}

/// In-memory entity store.
///
/// Used by the server binary and as the fixture store in tests.
#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    users: Arc<RwLock<Table<User>>>,
    projects: Arc<RwLock<Table<Project>>>,
    tasks: Arc<RwLock<Table<Task>>>,
    messages: Arc<RwLock<Table<ChatMessage>>>,
}

impl MemoryEntityStore {
    /// Creates a new in-memory entity store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        users.insert("User", user.id, user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id))
    }

    async fn get_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id)).collect())
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        let user = users.iter().find(|u| u.name == name).cloned();
        Ok(user)
    }

    async fn find_student_by_university_id(
        &self,
        university_id: i64,
    ) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        let student = users
            .iter()
            .find(|u| u.role.university_id() == Some(university_id))
            .cloned();
        Ok(student)
    }

    async fn list_users(&self, filter: UserFilter) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| filter.matches(u)).cloned().collect())
    }

    async fn count_users(&self, filter: UserFilter) -> StoreResult<u64> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| filter.matches(u)).count() as u64)
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        users.replace("User", user.id, user)
    }

    // =========================================================================
    // Project operations
    // =========================================================================

    async fn create_project(&self, project: Project) -> StoreResult<Project> {
        let mut projects = self.projects.write().await;
        projects.insert("Project", project.id, project)
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let projects = self.projects.read().await;
        Ok(projects.get(&id))
    }

    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
        let projects = self.projects.read().await;
        Ok(projects
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn count_projects(&self, filter: ProjectFilter) -> StoreResult<u64> {
        let projects = self.projects.read().await;
        Ok(projects.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn update_project(&self, project: Project) -> StoreResult<Project> {
        let mut projects = self.projects.write().await;
        projects.replace("Project", project.id, project)
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, task: Task) -> StoreResult<Task> {
        let mut tasks = self.tasks.write().await;
        tasks.insert("Task", task.id, task)
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id))
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn count_tasks(&self, filter: TaskFilter) -> StoreResult<u64> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| filter.matches(t)).count() as u64)
    }

    async fn update_task(&self, task: Task) -> StoreResult<Task> {
        let mut tasks = self.tasks.write().await;
        tasks.replace("Task", task.id, task)
    }

    // =========================================================================
    // Chat message operations
    // =========================================================================

    async fn create_message(&self, message: ChatMessage) -> StoreResult<ChatMessage> {
        let mut messages = self.messages.write().await;
        messages.insert("ChatMessage", message.id, message)
    }

    async fn list_messages(&self, filter: MessageFilter) -> StoreResult<Vec<ChatMessage>> {
        let messages = self.messages.read().await;
        Ok(messages
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }
}
