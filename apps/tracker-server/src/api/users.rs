//! User queries and mutations.

use chrono::Utc;
use entities::{RoleKind, User};
use entity_store::{EntityStore, UserFilter};
use rpc_protocol::{CreateUserRequest, UpdateUserRequest, UserDetailView, UserLocator};

use crate::{
    api::convert::{parse_id, parse_role, required, user_detail_view},
    error::{ServerError, ServerResult},
    state::AppState,
};

/// `users`: all students, in store order.
pub async fn users<S: EntityStore>(state: &AppState<S>) -> ServerResult<Vec<UserDetailView>> {
    list_by_role(state, RoleKind::Student).await
}

/// `admins`: all admins, in store order.
pub async fn admins<S: EntityStore>(state: &AppState<S>) -> ServerResult<Vec<UserDetailView>> {
    list_by_role(state, RoleKind::Admin).await
}

async fn list_by_role<S: EntityStore>(
    state: &AppState<S>,
    role: RoleKind,
) -> ServerResult<Vec<UserDetailView>> {
    let users = state.store.list_users(UserFilter::role(role)).await?;
    let mut views = Vec::with_capacity(users.len());
    for user in &users {
        views.push(user_detail_view(&state.store, user).await?);
    }
    Ok(views)
}

/// `user(id, name)`: exactly one locator must be given.
pub async fn user<S: EntityStore>(
    state: &AppState<S>,
    locator: UserLocator,
) -> ServerResult<UserDetailView> {
    let id = locator.id.filter(|v| !v.trim().is_empty());
    let name = locator.name.filter(|v| !v.trim().is_empty());

    let user = match (id, name) {
        (Some(id), None) => {
            let uuid = parse_id("id", &id)?;
            state
                .store
                .get_user(uuid)
                .await?
                .ok_or_else(|| ServerError::not_found(format!("User with ID \"{id}\" not found")))?
        }
        (None, Some(name)) => state
            .store
            .find_user_by_name(&name)
            .await?
            .ok_or_else(|| ServerError::not_found(format!("User with name \"{name}\" not found")))?,
        (Some(_), Some(_)) => {
            return Err(ServerError::bad_request(
                "Provide either 'id' or 'name' to query a user, not both",
            ));
        }
        (None, None) => {
            return Err(ServerError::bad_request(
                "You must provide either 'id' or 'name' to query a user",
            ));
        }
    };

    user_detail_view(&state.store, &user).await
}

/// `createUser`: validates, hashes the password and stores the user.
pub async fn create_user<S: EntityStore>(
    state: &AppState<S>,
    req: CreateUserRequest,
) -> ServerResult<UserDetailView> {
    let name = required("name", req.name)?;
    let role = required("role", req.role)?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ServerError::bad_request("password is required"))?;
    let role = parse_role(&role, req.uni_id)?;

    let password_hash = state.credentials.hash_password(&password).await?;
    let user = User::new(name, password_hash, role);

    let _guard = state.lock_writes().await;
    state.validator().validate_user_write(&user, false).await?;
    let user = state.store.create_user(user).await?;

    tracing::info!(user_id = %user.id, role = %user.role.kind(), "User created");
    user_detail_view(&state.store, &user).await
}

/// `updateUser`: partial update. Absent fields keep their current value.
pub async fn update_user<S: EntityStore>(
    state: &AppState<S>,
    req: UpdateUserRequest,
) -> ServerResult<UserDetailView> {
    let id = parse_id("id", &req.id)?;

    let _guard = state.lock_writes().await;
    let current = state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ServerError::not_found(format!("User with ID \"{}\" not found", req.id)))?;

    let role_label = match req.role {
        Some(role) => role,
        None => current.role.kind().to_string(),
    };
    let role = parse_role(&role_label, req.uni_id.or(current.role.university_id()))?;

    let updated = User {
        name: req.name.map(|n| n.trim().to_string()).unwrap_or_else(|| current.name.clone()),
        role,
        updated_at: Utc::now(),
        ..current.clone()
    };

    let validator = state.validator();
    validator.validate_user_transition(&current, &updated).await?;
    validator.validate_user_write(&updated, true).await?;
    let user = state.store.update_user(updated).await?;

    tracing::info!(
        user_id = %user.id,
        role = %user.role.kind(),
        role_changed = current.role.kind() != user.role.kind(),
        "User updated"
    );
    user_detail_view(&state.store, &user).await
}
