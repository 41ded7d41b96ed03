//! Project queries and mutations.

use chrono::Utc;
use entities::Project;
use entity_store::{EntityStore, ProjectFilter};
use rpc_protocol::{
    CreateProjectRequest, IdRequest, ProjectInput, ProjectView, ProjectsByAdminRequest,
    UpdateProjectRequest,
};

use crate::{
    api::convert::{parse_date, parse_id, parse_ids, parse_status, project_view, project_views},
    error::{ServerError, ServerResult},
    state::AppState,
};

/// `projects`: every project with nested students and tasks.
pub async fn projects<S: EntityStore>(state: &AppState<S>) -> ServerResult<Vec<ProjectView>> {
    let projects = state.store.list_projects(ProjectFilter::default()).await?;
    project_views(&state.store, &projects).await
}

/// `project(id)`.
pub async fn project<S: EntityStore>(
    state: &AppState<S>,
    req: IdRequest,
) -> ServerResult<ProjectView> {
    let project = find_project(state, &req.id).await?;
    project_view(&state.store, &project).await
}

/// `projectsByAdmin(adminName)`.
pub async fn projects_by_admin<S: EntityStore>(
    state: &AppState<S>,
    req: ProjectsByAdminRequest,
) -> ServerResult<Vec<ProjectView>> {
    let filter = ProjectFilter {
        admin_name: Some(req.admin_name),
        ..Default::default()
    };
    let projects = state.store.list_projects(filter).await?;
    project_views(&state.store, &projects).await
}

/// `createProject(input)`.
pub async fn create_project<S: EntityStore>(
    state: &AppState<S>,
    req: CreateProjectRequest,
) -> ServerResult<ProjectView> {
    let candidate = merge_project(req.input, None)?;

    let _guard = state.lock_writes().await;
    state.validator().validate_project_write(&candidate).await?;
    let project = state.store.create_project(candidate).await?;
    drop(_guard);

    tracing::info!(
        project_id = %project.id,
        admin = %project.admin_name,
        students = project.assigned_students.len(),
        "Project created"
    );
    project_view(&state.store, &project).await
}

/// `updateProject(id, input)`: absent fields keep their value and the
/// result is validated as a whole.
pub async fn update_project<S: EntityStore>(
    state: &AppState<S>,
    req: UpdateProjectRequest,
) -> ServerResult<ProjectView> {
    let _guard = state.lock_writes().await;
    let current = find_project(state, &req.id).await?;
    let candidate = merge_project(req.input, Some(current))?;

    state.validator().validate_project_write(&candidate).await?;
    let project = state.store.update_project(candidate).await?;
    drop(_guard);

    tracing::info!(project_id = %project.id, "Project updated");
    project_view(&state.store, &project).await
}

async fn find_project<S: EntityStore>(state: &AppState<S>, raw_id: &str) -> ServerResult<Project> {
    let id = parse_id("project id", raw_id)?;
    state
        .store
        .get_project(id)
        .await?
        .ok_or_else(|| ServerError::not_found(format!("Project with ID \"{raw_id}\" not found")))
}

/// Applies `input` on top of `current`, or builds a fresh project when
/// there is none. Text fields are left for the validator to check.
fn merge_project(input: ProjectInput, current: Option<Project>) -> ServerResult<Project> {
    let start_date = match (input.start_date, &current) {
        (Some(raw), _) => parse_date("startDate", &raw)?,
        (None, Some(p)) => p.start_date,
        (None, None) => return Err(ServerError::bad_request("startDate is required")),
    };
    let end_date = match (input.end_date, &current) {
        (Some(raw), _) => parse_date("endDate", &raw)?,
        (None, Some(p)) => p.end_date,
        (None, None) => return Err(ServerError::bad_request("endDate is required")),
    };
    let assigned_students = match (input.assigned_students, &current) {
        (Some(ids), _) => parse_ids("student id", &ids)?,
        (None, Some(p)) => p.assigned_students.clone(),
        (None, None) => Vec::new(),
    };
    // A blank label counts as absent.
    let status = match (input.project_status.filter(|raw| !raw.trim().is_empty()), &current) {
        (None, Some(p)) => p.status,
        (raw, _) => parse_status(raw.as_deref())?,
    };

    let mut project = match current {
        Some(p) => p,
        None => Project::new("", "", start_date, end_date),
    };
    if let Some(title) = input.project_title {
        project.title = title.trim().to_string();
    }
    if let Some(description) = input.project_description {
        project.description = description.trim().to_string();
    }
    if let Some(category) = input.category {
        project.category = category.trim().to_string();
    }
    if let Some(admin_name) = input.admin_name {
        project.admin_name = admin_name.trim().to_string();
    }
    project.start_date = start_date;
    project.end_date = end_date;
    project.assigned_students = assigned_students;
    project.status = status;
    project.updated_at = Utc::now();

    Ok(project)
}

#[cfg(test)]
mod tests {
    use entities::WorkStatus;

    use super::*;

    fn input() -> ProjectInput {
        ProjectInput {
            project_title: Some("Thesis".into()),
            project_description: Some("Write it".into()),
            category: Some("Research".into()),
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-02-01".into()),
            project_status: None,
            assigned_students: Some(vec![uuid::Uuid::new_v4().to_string()]),
            admin_name: Some("Dr.X".into()),
        }
    }

    #[test]
    fn test_merge_new_project_defaults_to_pending() {
        let project = merge_project(input(), None).unwrap();
        assert_eq!(project.title, "Thesis");
        assert_eq!(project.status, WorkStatus::Pending);
        assert_eq!(project.start_date_string(), "2024-01-01");
    }

    #[test]
    fn test_merge_requires_dates_for_new_project() {
        let mut partial = input();
        partial.end_date = None;
        assert!(matches!(
            merge_project(partial, None).unwrap_err(),
            ServerError::BadRequest(_)
        ));
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let current = merge_project(input(), None).unwrap();
        let patch = ProjectInput {
            project_status: Some("Completed".into()),
            ..Default::default()
        };

        let merged = merge_project(patch, Some(current.clone())).unwrap();
        assert_eq!(merged.id, current.id);
        assert_eq!(merged.title, current.title);
        assert_eq!(merged.assigned_students, current.assigned_students);
        assert_eq!(merged.status, WorkStatus::Completed);
    }

    #[test]
    fn test_merge_rejects_malformed_student_id() {
        let mut bad = input();
        bad.assigned_students = Some(vec!["nope".into()]);
        assert!(matches!(
            merge_project(bad, None).unwrap_err(),
            ServerError::BadRequest(_)
        ));
    }

    #[test]
    fn test_merge_blank_status() {
        let mut fresh = input();
        fresh.project_status = Some(String::new());
        assert_eq!(merge_project(fresh, None).unwrap().status, WorkStatus::Pending);

        let mut done = input();
        done.project_status = Some("Completed".into());
        let current = merge_project(done, None).unwrap();
        let patch = ProjectInput {
            project_status: Some(String::new()),
            ..Default::default()
        };
        let merged = merge_project(patch, Some(current)).unwrap();
        assert_eq!(merged.status, WorkStatus::Completed);
    }
}
