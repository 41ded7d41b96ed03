//! Login.

use entity_store::EntityStore;
use rpc_protocol::{AuthPayload, LoginRequest};

use crate::{api::convert::user_detail_view, error::ServerResult, state::AppState};

/// `login(name, password)`: returns a session token and the user.
pub async fn login<S: EntityStore>(
    state: &AppState<S>,
    req: LoginRequest,
) -> ServerResult<AuthPayload> {
    let user = state.store.find_user_by_name(req.name.trim()).await?;
    let session = state.credentials.login(user, &req.password).await?;

    Ok(AuthPayload {
        token: session.token,
        user: user_detail_view(&state.store, &session.user).await?,
    })
}
