//! Task queries and mutations.

use chrono::Utc;
use entities::Task;
use entity_store::{EntityStore, ProjectFilter, TaskFilter};
use rpc_protocol::{
    AdminTasksRequest, CreateTaskRequest, IdRequest, TaskInput, TaskView, TasksByAdminRequest,
    UpdateTaskRequest,
};
use uuid::Uuid;

use crate::{
    api::convert::{parse_date, parse_id, parse_ids, parse_status, task_view, task_views},
    error::{ServerError, ServerResult},
    state::AppState,
};

/// `tasks`: every task.
pub async fn tasks<S: EntityStore>(state: &AppState<S>) -> ServerResult<Vec<TaskView>> {
    let tasks = state.store.list_tasks(TaskFilter::default()).await?;
    task_views(&state.store, &tasks).await
}

/// `task(id)`.
pub async fn task<S: EntityStore>(state: &AppState<S>, req: IdRequest) -> ServerResult<TaskView> {
    let task = find_task(state, &req.id).await?;
    task_view(&state.store, &task).await
}

/// `tasksByAdmin(projectId)`: the tasks of one project.
pub async fn tasks_by_admin<S: EntityStore>(
    state: &AppState<S>,
    req: TasksByAdminRequest,
) -> ServerResult<Vec<TaskView>> {
    let project_id = parse_id("projectId", &req.project_id)?;
    if state.store.get_project(project_id).await?.is_none() {
        return Err(ServerError::not_found(format!(
            "Project with ID \"{}\" not found",
            req.project_id
        )));
    }

    let tasks = state.store.list_tasks(TaskFilter::project(project_id)).await?;
    task_views(&state.store, &tasks).await
}

/// `adminTasks(adminId)`: tasks of every project owned by the admin.
///
/// The admin may be given by id or by name, since projects refer to their
/// admin by name.
pub async fn admin_tasks<S: EntityStore>(
    state: &AppState<S>,
    req: AdminTasksRequest,
) -> ServerResult<Vec<TaskView>> {
    let admin_name = match Uuid::parse_str(req.admin_id.trim()) {
        Ok(id) => match state.store.get_user(id).await? {
            Some(user) => user.name,
            None => return Ok(Vec::new()),
        },
        Err(_) => req.admin_id,
    };

    let projects = state
        .store
        .list_projects(ProjectFilter {
            admin_name: Some(admin_name),
            ..Default::default()
        })
        .await?;
    if projects.is_empty() {
        return Ok(Vec::new());
    }

    let filter = TaskFilter {
        project_ids: Some(projects.iter().map(|p| p.id).collect()),
        ..Default::default()
    };
    let tasks = state.store.list_tasks(filter).await?;
    task_views(&state.store, &tasks).await
}

/// `createTask(projectTitle, taskName, description, assignedStudents, status, dueDate)`.
pub async fn create_task<S: EntityStore>(
    state: &AppState<S>,
    req: CreateTaskRequest,
) -> ServerResult<TaskView> {
    let candidate = merge_task(req, None)?;

    let _guard = state.lock_writes().await;
    state.validator().validate_task_write(&candidate).await?;
    let task = state.store.create_task(candidate).await?;
    drop(_guard);

    tracing::info!(
        task_id = %task.id,
        project_id = %task.project_id,
        students = task.assigned_students.len(),
        "Task created"
    );
    task_view(&state.store, &task).await
}

/// `updateTask(id, ...)`: absent fields keep their value and the result is
/// validated as a whole.
pub async fn update_task<S: EntityStore>(
    state: &AppState<S>,
    req: UpdateTaskRequest,
) -> ServerResult<TaskView> {
    let _guard = state.lock_writes().await;
    let current = find_task(state, &req.id).await?;
    let candidate = merge_task(req.input, Some(current))?;

    state.validator().validate_task_write(&candidate).await?;
    let task = state.store.update_task(candidate).await?;
    drop(_guard);

    tracing::info!(task_id = %task.id, "Task updated");
    task_view(&state.store, &task).await
}

async fn find_task<S: EntityStore>(state: &AppState<S>, raw_id: &str) -> ServerResult<Task> {
    let id = parse_id("task id", raw_id)?;
    state
        .store
        .get_task(id)
        .await?
        .ok_or_else(|| ServerError::not_found(format!("Task with ID \"{raw_id}\" not found")))
}

/// Applies `input` on top of `current`, or builds a fresh task when there is
/// none.
fn merge_task(input: TaskInput, current: Option<Task>) -> ServerResult<Task> {
    let project_id = match (input.project_title, &current) {
        (Some(raw), _) => parse_id("projectTitle", &raw)?,
        (None, Some(t)) => t.project_id,
        (None, None) => return Err(ServerError::bad_request("projectTitle is required")),
    };
    let due_date = match (input.due_date, &current) {
        (Some(raw), _) => parse_date("dueDate", &raw)?,
        (None, Some(t)) => t.due_date,
        (None, None) => return Err(ServerError::bad_request("dueDate is required")),
    };
    let assigned_students = match (input.assigned_students, &current) {
        (Some(ids), _) => parse_ids("student id", &ids)?,
        (None, Some(t)) => t.assigned_students.clone(),
        (None, None) => Vec::new(),
    };
    // A blank label counts as absent.
    let status = match (input.status.filter(|raw| !raw.trim().is_empty()), &current) {
        (None, Some(t)) => t.status,
        (raw, _) => parse_status(raw.as_deref())?,
    };

    let mut task = match current {
        Some(t) => t,
        None => Task::new(project_id, "", due_date),
    };
    if let Some(name) = input.task_name {
        task.name = name.trim().to_string();
    }
    if let Some(description) = input.description {
        task.description = description.trim().to_string();
    }
    task.project_id = project_id;
    task.due_date = due_date;
    task.assigned_students = assigned_students;
    task.status = status;
    task.updated_at = Utc::now();

    Ok(task)
}

#[cfg(test)]
mod tests {
    use entities::WorkStatus;

    use super::*;

    #[test]
    fn test_merge_new_task() {
        let project_id = Uuid::new_v4();
        let input = TaskInput {
            project_title: Some(project_id.to_string()),
            task_name: Some("Draft".into()),
            description: Some("First draft".into()),
            assigned_students: Some(vec![Uuid::new_v4().to_string()]),
            status: Some("In Progress".into()),
            due_date: Some("2024-01-15T12:00:00Z".into()),
        };

        let task = merge_task(input, None).unwrap();
        assert_eq!(task.project_id, project_id);
        assert_eq!(task.status, WorkStatus::InProgress);
        assert_eq!(task.due_date_string(), "2024-01-15T12:00:00.000Z");
    }

    #[test]
    fn test_merge_rejects_malformed_project_id() {
        let input = TaskInput {
            project_title: Some("Thesis".into()),
            due_date: Some("2024-01-15".into()),
            ..Default::default()
        };
        assert!(matches!(
            merge_task(input, None).unwrap_err(),
            ServerError::BadRequest(_)
        ));
    }

    #[test]
    fn test_merge_blank_status_keeps_current() {
        let current = merge_task(
            TaskInput {
                project_title: Some(Uuid::new_v4().to_string()),
                status: Some("Completed".into()),
                due_date: Some("2024-01-15".into()),
                ..Default::default()
            },
            None,
        )
        .unwrap();

        let patch = TaskInput {
            status: Some("  ".into()),
            ..Default::default()
        };
        let merged = merge_task(patch, Some(current)).unwrap();
        assert_eq!(merged.status, WorkStatus::Completed);
    }
}
