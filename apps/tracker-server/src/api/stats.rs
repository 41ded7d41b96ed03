//! Aggregate counts.

use entities::{RoleKind, WorkStatus};
use entity_store::{EntityStore, ProjectFilter, TaskFilter, UserFilter};

use crate::{error::ServerResult, state::AppState};

/// `numberOfStudents`.
pub async fn number_of_students<S: EntityStore>(state: &AppState<S>) -> ServerResult<u64> {
    Ok(state.store.count_users(UserFilter::role(RoleKind::Student)).await?)
}

/// `numberOfProjects`.
pub async fn number_of_projects<S: EntityStore>(state: &AppState<S>) -> ServerResult<u64> {
    Ok(state.store.count_projects(ProjectFilter::default()).await?)
}

/// `numberOfTasks`.
pub async fn number_of_tasks<S: EntityStore>(state: &AppState<S>) -> ServerResult<u64> {
    Ok(state.store.count_tasks(TaskFilter::default()).await?)
}

/// `numberOfFinishedProjects`: projects whose status is `Completed`.
pub async fn number_of_finished_projects<S: EntityStore>(
    state: &AppState<S>,
) -> ServerResult<u64> {
    let filter = ProjectFilter {
        status: Some(WorkStatus::Completed),
        ..Default::default()
    };
    Ok(state.store.count_projects(filter).await?)
}
