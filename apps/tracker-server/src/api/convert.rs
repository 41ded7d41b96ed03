//! Parsing of wire values and rendering of response views.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use entities::{start_of_day, ChatMessage, Project, Role, Task, User, WorkStatus};
use entity_store::{EntityStore, ProjectFilter, TaskFilter};
use rpc_protocol::{ChatMessageView, ProjectRef, ProjectView, TaskView, UserDetailView, UserView};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

// ============================================================================
// Parsing
// ============================================================================

/// Parses an id sent as a string.
pub fn parse_id(field: &str, raw: &str) -> ServerResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ServerError::bad_request(format!("Invalid {field}: {raw}")))
}

/// Parses a list of ids, keeping input order and duplicates.
pub fn parse_ids(field: &str, raw: &[String]) -> ServerResult<Vec<Uuid>> {
    raw.iter().map(|id| parse_id(field, id)).collect()
}

/// Parses a date given either as `YYYY-MM-DD` (midnight UTC) or as an
/// RFC 3339 timestamp.
pub fn parse_date(field: &str, raw: &str) -> ServerResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(start_of_day(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ServerError::bad_request(format!("Invalid {field}: {raw}")))
}

/// Parses a status label, defaulting to `Pending` when absent.
pub fn parse_status(raw: Option<&str>) -> ServerResult<WorkStatus> {
    match raw {
        None => Ok(WorkStatus::default()),
        Some(raw) if raw.trim().is_empty() => Ok(WorkStatus::default()),
        Some(raw) => raw
            .parse()
            .map_err(|e: entities::UnknownStatus| ServerError::bad_request(e.to_string())),
    }
}

/// Builds a role from its label and the optional university id.
pub fn parse_role(role: &str, uni_id: Option<i64>) -> ServerResult<Role> {
    match role.trim() {
        "Student" => uni_id
            .map(|university_id| Role::Student { university_id })
            .ok_or_else(|| ServerError::bad_request("UniId is required for students")),
        "Admin" => Ok(Role::Admin),
        _ => Err(ServerError::bad_request("Role must be 'Student' or 'Admin'")),
    }
}

/// Returns the trimmed value or a `BadRequest` naming the field.
pub fn required(field: &str, value: Option<String>) -> ServerResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServerError::bad_request(format!("{field} is required"))),
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Renders a user. The password hash is never part of the view.
pub fn user_view(user: &User) -> UserView {
    UserView {
        id: user.id.to_string(),
        name: user.name.clone(),
        role: user.role.kind().to_string(),
        uni_id: user.role.university_id(),
    }
}

/// Renders a user with every project and task they are assigned to, in
/// store order. Admins are never assigned, so their lists are empty.
pub async fn user_detail_view<S: EntityStore>(
    store: &S,
    user: &User,
) -> ServerResult<UserDetailView> {
    let projects = store
        .list_projects(ProjectFilter {
            assigned_student: Some(user.id),
            ..Default::default()
        })
        .await?;
    let tasks = store
        .list_tasks(TaskFilter {
            assigned_student: Some(user.id),
            ..Default::default()
        })
        .await?;

    Ok(UserDetailView {
        user: user_view(user),
        projects: project_views(store, &projects).await?,
        tasks: task_views(store, &tasks).await?,
    })
}

/// Renders users that still resolve among `ids`, in input order.
async fn student_views<S: EntityStore>(store: &S, ids: &[Uuid]) -> ServerResult<Vec<UserView>> {
    Ok(store.get_users(ids).await?.iter().map(user_view).collect())
}

/// Renders a task with its project reference and assigned students.
pub async fn task_view<S: EntityStore>(store: &S, task: &Task) -> ServerResult<TaskView> {
    let project_title = store.get_project(task.project_id).await?.map(|p| ProjectRef {
        id: p.id.to_string(),
        project_title: p.title,
    });

    Ok(TaskView {
        id: task.id.to_string(),
        task_name: task.name.clone(),
        description: task.description.clone(),
        status: task.status.to_string(),
        due_date: task.due_date_string(),
        project_title,
        assigned_students: student_views(store, &task.assigned_students).await?,
    })
}

/// Renders a list of tasks.
pub async fn task_views<S: EntityStore>(store: &S, tasks: &[Task]) -> ServerResult<Vec<TaskView>> {
    let mut views = Vec::with_capacity(tasks.len());
    for task in tasks {
        views.push(task_view(store, task).await?);
    }
    Ok(views)
}

/// Renders a project with its assigned students and tasks.
pub async fn project_view<S: EntityStore>(store: &S, project: &Project) -> ServerResult<ProjectView> {
    let tasks = store.list_tasks(TaskFilter::project(project.id)).await?;

    Ok(ProjectView {
        id: project.id.to_string(),
        project_title: project.title.clone(),
        project_description: project.description.clone(),
        category: project.category.clone(),
        start_date: project.start_date_string(),
        end_date: project.end_date_string(),
        project_status: project.status.to_string(),
        assigned_students: student_views(store, &project.assigned_students).await?,
        admin_name: project.admin_name.clone(),
        tasks: task_views(store, &tasks).await?,
    })
}

/// Renders a list of projects.
pub async fn project_views<S: EntityStore>(
    store: &S,
    projects: &[Project],
) -> ServerResult<Vec<ProjectView>> {
    let mut views = Vec::with_capacity(projects.len());
    for project in projects {
        views.push(project_view(store, project).await?);
    }
    Ok(views)
}

/// Renders a message from already resolved participants.
pub fn message_view(message: &ChatMessage, sender: &User, receiver: &User) -> ChatMessageView {
    ChatMessageView {
        id: message.id.to_string(),
        sender: user_view(sender),
        receiver: user_view(receiver),
        message: message.message.clone(),
        timestamp: message.timestamp_string(),
    }
}

/// Sorts messages by timestamp and renders them, dropping any whose sender
/// or receiver no longer resolves.
pub async fn message_views<S: EntityStore>(
    store: &S,
    mut messages: Vec<ChatMessage>,
) -> ServerResult<Vec<ChatMessageView>> {
    messages.sort_by_key(|m| m.timestamp);

    let mut users: HashMap<Uuid, Option<User>> = HashMap::new();
    let mut views = Vec::with_capacity(messages.len());
    for message in &messages {
        for id in [message.sender_id, message.receiver_id] {
            if !users.contains_key(&id) {
                users.insert(id, store.get_user(id).await?);
            }
        }

        let sender = users.get(&message.sender_id).and_then(Option::as_ref);
        let receiver = users.get(&message.receiver_id).and_then(Option::as_ref);
        match (sender, receiver) {
            (Some(sender), Some(receiver)) => views.push(message_view(message, sender, receiver)),
            _ => tracing::debug!(message_id = %message.id, "Skipping message with dangling participant"),
        }
    }
    Ok(views)
}
