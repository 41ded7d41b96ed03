//! Timeout decorator for entity stores.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use entities::{ChatMessage, Project, Task, User};
use uuid::Uuid;

use crate::{
    EntityStore, MessageFilter, ProjectFilter, StoreError, StoreResult, TaskFilter, UserFilter,
};

/// Default bound applied to every store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs a store call, failing with [`StoreError::Timeout`] if it does not
/// finish within `after`.
pub async fn with_timeout<T, F>(operation: &'static str, after: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout_ms = after.as_millis() as u64, "Store call timed out");
            Err(StoreError::timeout(operation, after))
        }
    }
}

/// Wraps an [`EntityStore`] so that every call is bounded by a timeout.
#[derive(Debug)]
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: EntityStore> TimeoutStore<S> {
    /// Wraps `inner` with the given per-call timeout.
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<S: EntityStore> EntityStore for TimeoutStore<S> {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        with_timeout("create_user", self.timeout, self.inner.create_user(user)).await
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        with_timeout("get_user", self.timeout, self.inner.get_user(id)).await
    }

    async fn get_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        with_timeout("get_users", self.timeout, self.inner.get_users(ids)).await
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        with_timeout(
            "find_user_by_name",
            self.timeout,
            self.inner.find_user_by_name(name),
        )
        .await
    }

    async fn find_student_by_university_id(
        &self,
        university_id: i64,
    ) -> StoreResult<Option<User>> {
        with_timeout(
            "find_student_by_university_id",
            self.timeout,
            self.inner.find_student_by_university_id(university_id),
        )
        .await
    }

    async fn list_users(&self, filter: UserFilter) -> StoreResult<Vec<User>> {
        with_timeout("list_users", self.timeout, self.inner.list_users(filter)).await
    }

    async fn count_users(&self, filter: UserFilter) -> StoreResult<u64> {
        with_timeout("count_users", self.timeout, self.inner.count_users(filter)).await
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        with_timeout("update_user", self.timeout, self.inner.update_user(user)).await
    }

    async fn create_project(&self, project: Project) -> StoreResult<Project> {
        with_timeout(
            "create_project",
            self.timeout,
            self.inner.create_project(project),
        )
        .await
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        with_timeout("get_project", self.timeout, self.inner.get_project(id)).await
    }

    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
        with_timeout("list_projects", self.timeout, self.inner.list_projects(filter)).await
    }

    async fn count_projects(&self, filter: ProjectFilter) -> StoreResult<u64> {
        with_timeout(
            "count_projects",
            self.timeout,
            self.inner.count_projects(filter),
        )
        .await
    }

    async fn update_project(&self, project: Project) -> StoreResult<Project> {
        with_timeout(
            "update_project",
            self.timeout,
            self.inner.update_project(project),
        )
        .await
    }

    async fn create_task(&self, task: Task) -> StoreResult<Task> {
        with_timeout("create_task", self.timeout, self.inner.create_task(task)).await
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        with_timeout("get_task", self.timeout, self.inner.get_task(id)).await
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        with_timeout("list_tasks", self.timeout, self.inner.list_tasks(filter)).await
    }

    async fn count_tasks(&self, filter: TaskFilter) -> StoreResult<u64> {
        with_timeout("count_tasks", self.timeout, self.inner.count_tasks(filter)).await
    }

    async fn update_task(&self, task: Task) -> StoreResult<Task> {
        with_timeout("update_task", self.timeout, self.inner.update_task(task)).await
    }

    async fn create_message(&self, message: ChatMessage) -> StoreResult<ChatMessage> {
        with_timeout(
            "create_message",
            self.timeout,
            self.inner.create_message(message),
        )
        .await
    }

    async fn list_messages(&self, filter: MessageFilter) -> StoreResult<Vec<ChatMessage>> {
        with_timeout("list_messages", self.timeout, self.inner.list_messages(filter)).await
    }
}
