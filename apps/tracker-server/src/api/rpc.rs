//! JSON-RPC endpoint.
//!
//! Every query and mutation is a JSON-RPC 2.0 method named after its field.
//! The HTTP status is always 200; failures travel in the `error` member of
//! the envelope.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use entity_store::EntityStore;
use rpc_protocol::{is_public_method, method_names, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    api::{auth, messages, projects, stats, tasks, users},
    error::{ServerError, ServerResult},
    middleware::auth::AuthenticatedUser,
    state::AppState,
};

/// Handles a JSON-RPC request.
pub async fn handle_rpc<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: Option<Extension<AuthenticatedUser>>,
    request: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> (StatusCode, Json<JsonRpcResponse>) {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = JsonRpcError::parse_error(rejection.body_text());
            return (StatusCode::OK, Json(JsonRpcResponse::error(serde_json::Value::Null, error)));
        }
    };

    let user = user.map(|Extension(user)| user);
    let response = match dispatch_method(&state, user.as_ref(), &request).await {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(error) => JsonRpcResponse::error(request.id, error),
    };

    (StatusCode::OK, Json(response))
}

/// Dispatches a method call to its handler.
pub async fn dispatch_method<S: EntityStore>(
    state: &AppState<S>,
    user: Option<&AuthenticatedUser>,
    request: &JsonRpcRequest,
) -> Result<serde_json::Value, JsonRpcError> {
    if state.config.require_auth && user.is_none() && !is_public_method(&request.method) {
        return Err(ServerError::AuthenticationRequired.into());
    }

    if let Some(user) = user {
        tracing::debug!(method = %request.method, user_id = %user.id, "RPC call");
    }

    let params = &request.params;
    match request.method.as_str() {
        // User queries
        method_names::USERS => respond(users::users(state).await),
        method_names::ADMINS => respond(users::admins(state).await),
        method_names::USER => respond(users::user(state, parse_params_or_default(params)?).await),

        // Project queries
        method_names::PROJECTS => respond(projects::projects(state).await),
        method_names::PROJECT => respond(projects::project(state, parse_params(params)?).await),
        method_names::PROJECTS_BY_ADMIN => {
            respond(projects::projects_by_admin(state, parse_params(params)?).await)
        }

        // Task queries
        method_names::TASKS => respond(tasks::tasks(state).await),
        method_names::TASK => respond(tasks::task(state, parse_params(params)?).await),
        method_names::TASKS_BY_ADMIN => {
            respond(tasks::tasks_by_admin(state, parse_params(params)?).await)
        }
        method_names::ADMIN_TASKS => respond(tasks::admin_tasks(state, parse_params(params)?).await),

        // Counts
        method_names::NUMBER_OF_STUDENTS => respond(stats::number_of_students(state).await),
        method_names::NUMBER_OF_PROJECTS => respond(stats::number_of_projects(state).await),
        method_names::NUMBER_OF_TASKS => respond(stats::number_of_tasks(state).await),
        method_names::NUMBER_OF_FINISHED_PROJECTS => {
            respond(stats::number_of_finished_projects(state).await)
        }

        // Message queries
        method_names::MESSAGES => respond(messages::messages(state, parse_params(params)?).await),
        method_names::RECEIVED_MESSAGES => {
            respond(messages::received_messages(state, parse_params(params)?).await)
        }

        // Mutations
        method_names::CREATE_USER => {
            respond(users::create_user(state, parse_params_or_default(params)?).await)
        }
        method_names::UPDATE_USER => respond(users::update_user(state, parse_params(params)?).await),
        method_names::LOGIN => respond(auth::login(state, parse_params(params)?).await),
        method_names::CREATE_PROJECT => {
            respond(projects::create_project(state, parse_params(params)?).await)
        }
        method_names::UPDATE_PROJECT => {
            respond(projects::update_project(state, parse_params(params)?).await)
        }
        method_names::CREATE_TASK => {
            respond(tasks::create_task(state, parse_params_or_default(params)?).await)
        }
        method_names::UPDATE_TASK => respond(tasks::update_task(state, parse_params(params)?).await),
        method_names::SEND_MESSAGE => {
            respond(messages::send_message(state, parse_params(params)?).await)
        }

        _ => Err(JsonRpcError::method_not_found(&request.method)),
    }
}

/// Serializes a handler result into the envelope's `result` member.
fn respond<T: Serialize>(result: ServerResult<T>) -> Result<serde_json::Value, JsonRpcError> {
    let value = result?;
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

/// Parse params from JSON value
fn parse_params<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params.clone()).map_err(|e| JsonRpcError::invalid_params(e.to_string()))
}

/// Parse params or return default
fn parse_params_or_default<T: DeserializeOwned + Default>(
    params: &serde_json::Value,
) -> Result<T, JsonRpcError> {
    if params.is_null() {
        Ok(T::default())
    } else {
        parse_params(params)
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use entities::ChatMessage;
    use entity_store::MemoryEntityStore;
    use rpc_protocol::{DeliveryPayload, ErrorCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, create_app, create_state};

    const PASSWORD: &str = "secret1";

    fn setup(config: Config) -> (Router, Arc<AppState<MemoryEntityStore>>) {
        let state = create_state(config, MemoryEntityStore::new()).unwrap();
        (create_app(state.clone()), state)
    }

    async fn post_rpc(app: &Router, token: Option<&str>, method: &str, params: Value) -> (StatusCode, Value) {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        let mut builder = Request::builder()
            .uri("/rpc")
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = app
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn call(app: &Router, method: &str, params: Value) -> Value {
        let (status, body) = post_rpc(app, None, method, params).await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    /// Calls a method that must succeed and returns its result.
    async fn ok(app: &Router, method: &str, params: Value) -> Value {
        let body = call(app, method, params).await;
        assert!(body.get("error").is_none(), "{method} failed: {body}");
        body["result"].clone()
    }

    /// Calls a method that must fail and returns its error code.
    async fn fails(app: &Router, method: &str, params: Value) -> ErrorCode {
        let body = call(app, method, params).await;
        assert!(body.get("result").is_none(), "{method} succeeded: {body}");
        ErrorCode::from(body["error"]["code"].as_i64().unwrap() as i32)
    }

    async fn create_admin(app: &Router, name: &str) -> String {
        let user = ok(
            app,
            method_names::CREATE_USER,
            json!({ "name": name, "role": "Admin", "password": PASSWORD }),
        )
        .await;
        user["id"].as_str().unwrap().to_string()
    }

    async fn create_student(app: &Router, name: &str, uni_id: i64) -> String {
        let user = ok(
            app,
            method_names::CREATE_USER,
            json!({ "name": name, "role": "Student", "password": PASSWORD, "UniId": uni_id }),
        )
        .await;
        user["id"].as_str().unwrap().to_string()
    }

    fn project_input(admin: &str, students: &[&str], start: &str, end: &str) -> Value {
        json!({
            "input": {
                "projectTitle": "Thesis",
                "projectDescription": "Write the thesis",
                "category": "Research",
                "startDate": start,
                "endDate": end,
                "assignedStudents": students,
                "adminName": admin,
            }
        })
    }

    async fn count(app: &Router, method: &str) -> u64 {
        ok(app, method, Value::Null).await.as_u64().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = setup(Config::development());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_create_project_with_default_status() {
        let (app, _) = setup(Config::development());
        create_admin(&app, "Dr.X").await;
        let sam = create_student(&app, "Sam", 100).await;

        let project = ok(
            &app,
            method_names::CREATE_PROJECT,
            project_input("Dr.X", &[&sam], "2024-01-01", "2024-02-01"),
        )
        .await;

        assert_eq!(project["projectStatus"], "Pending");
        assert_eq!(project["startDate"], "2024-01-01");
        assert_eq!(project["endDate"], "2024-02-01");
        assert_eq!(project["adminName"], "Dr.X");
        assert_eq!(project["assignedStudents"][0]["name"], "Sam");
        assert_eq!(project["assignedStudents"][0]["UniId"], 100);
        assert_eq!(project["tasks"], json!([]));
    }

    #[tokio::test]
    async fn test_create_project_rejects_inverted_dates() {
        let (app, _) = setup(Config::development());
        create_admin(&app, "Dr.X").await;
        let sam = create_student(&app, "Sam", 100).await;

        let code = fails(
            &app,
            method_names::CREATE_PROJECT,
            project_input("Dr.X", &[&sam], "2024-02-01", "2024-01-01"),
        )
        .await;

        assert_eq!(code, ErrorCode::DateRangeInvalid);
        assert_eq!(count(&app, method_names::NUMBER_OF_PROJECTS).await, 0);
    }

    #[tokio::test]
    async fn test_create_project_rejects_whole_write_on_one_bad_student() {
        let (app, _) = setup(Config::development());
        let admin = create_admin(&app, "Dr.X").await;
        let sam = create_student(&app, "Sam", 100).await;

        let code = fails(
            &app,
            method_names::CREATE_PROJECT,
            project_input("Dr.X", &[&sam, &admin], "2024-01-01", "2024-02-01"),
        )
        .await;
        assert_eq!(code, ErrorCode::RoleMismatch);

        let missing = uuid::Uuid::new_v4().to_string();
        let code = fails(
            &app,
            method_names::CREATE_PROJECT,
            project_input("Dr.X", &[&sam, &missing], "2024-01-01", "2024-02-01"),
        )
        .await;
        assert_eq!(code, ErrorCode::ReferenceNotFound);

        assert_eq!(count(&app, method_names::NUMBER_OF_PROJECTS).await, 0);
    }

    #[tokio::test]
    async fn test_create_task_requires_existing_project() {
        let (app, _) = setup(Config::development());
        let sam = create_student(&app, "Sam", 100).await;

        let code = fails(
            &app,
            method_names::CREATE_TASK,
            json!({
                "projectTitle": uuid::Uuid::new_v4().to_string(),
                "taskName": "Draft",
                "description": "First draft",
                "assignedStudents": [sam],
                "dueDate": "2024-01-15",
            }),
        )
        .await;

        assert_eq!(code, ErrorCode::ReferenceNotFound);
        assert_eq!(count(&app, method_names::NUMBER_OF_TASKS).await, 0);
    }

    #[tokio::test]
    async fn test_create_student_requires_university_id() {
        let (app, _) = setup(Config::development());

        let body = call(
            &app,
            method_names::CREATE_USER,
            json!({ "name": "Sam", "role": "Student", "password": PASSWORD }),
        )
        .await;

        assert_eq!(body["error"]["code"], ErrorCode::BadRequest as i32);
        assert_eq!(body["error"]["data"]["kind"], "BadRequest");
        assert_eq!(count(&app, method_names::NUMBER_OF_STUDENTS).await, 0);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (app, _) = setup(Config::development());
        create_student(&app, "Sam", 100).await;

        let wrong_password = call(
            &app,
            method_names::LOGIN,
            json!({ "name": "Sam", "password": "not-the-password" }),
        )
        .await;
        let unknown_name = call(
            &app,
            method_names::LOGIN,
            json!({ "name": "Nobody", "password": PASSWORD }),
        )
        .await;

        assert_eq!(wrong_password["error"]["code"], ErrorCode::AuthenticationError as i32);
        assert_eq!(wrong_password["error"], unknown_name["error"]);
    }

    #[tokio::test]
    async fn test_login_returns_token_and_user() {
        let (app, state) = setup(Config::development());
        let sam = create_student(&app, "Sam", 100).await;

        let payload = ok(
            &app,
            method_names::LOGIN,
            json!({ "name": "Sam", "password": PASSWORD }),
        )
        .await;

        assert_eq!(payload["user"]["id"], sam);
        assert!(payload["user"].get("password").is_none());
        assert!(payload["user"].get("password_hash").is_none());

        let claims = state
            .credentials
            .validate_token(payload["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.sub, sam);
    }

    #[tokio::test]
    async fn test_send_message_without_live_connection() {
        let (app, _) = setup(Config::development());
        let alice = create_student(&app, "Alice", 1).await;
        let bob = create_student(&app, "Bob", 2).await;

        let sent = ok(
            &app,
            method_names::SEND_MESSAGE,
            json!({ "senderId": alice, "receiverId": bob, "message": "hi" }),
        )
        .await;
        assert_eq!(sent["message"], "Message sent");
        assert_eq!(sent["sentMessage"]["sender"]["id"], alice);
        assert_eq!(sent["sentMessage"]["receiver"]["id"], bob);

        ok(
            &app,
            method_names::SEND_MESSAGE,
            json!({ "senderId": bob, "receiverId": alice, "message": "hello" }),
        )
        .await;

        let forward = ok(
            &app,
            method_names::MESSAGES,
            json!({ "senderId": alice, "receiverId": bob }),
        )
        .await;
        let backward = ok(
            &app,
            method_names::MESSAGES,
            json!({ "senderId": bob, "receiverId": alice }),
        )
        .await;

        assert_eq!(forward, backward);
        let texts: Vec<_> = forward
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["message"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["hi", "hello"]);

        let received = ok(
            &app,
            method_names::RECEIVED_MESSAGES,
            json!({ "receiverId": bob }),
        )
        .await;
        assert_eq!(received.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_pushes_to_live_receiver() {
        let (app, state) = setup(Config::development());
        let alice = create_student(&app, "Alice", 1).await;
        let bob = create_student(&app, "Bob", 2).await;

        let bob_id = uuid::Uuid::parse_str(&bob).unwrap();
        let (mut session, mut outbound) = state.presence.connect(bob_id);
        state.presence.open(&mut session).await;

        ok(
            &app,
            method_names::SEND_MESSAGE,
            json!({ "senderId": alice, "receiverId": bob, "message": "ping" }),
        )
        .await;

        let frame = outbound.try_recv().unwrap();
        let payload: DeliveryPayload = serde_json::from_str(&frame).unwrap();
        assert_eq!(payload.sender, alice);
        assert_eq!(payload.message, "ping");
    }

    #[tokio::test]
    async fn test_send_message_to_self_is_rejected() {
        let (app, _) = setup(Config::development());
        let alice = create_student(&app, "Alice", 1).await;

        let code = fails(
            &app,
            method_names::SEND_MESSAGE,
            json!({ "senderId": alice, "receiverId": alice, "message": "hi" }),
        )
        .await;
        assert_eq!(code, ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_user_uniqueness() {
        let (app, _) = setup(Config::development());
        create_student(&app, "Sam", 100).await;

        let code = fails(
            &app,
            method_names::CREATE_USER,
            json!({ "name": "Sam", "role": "Admin", "password": PASSWORD }),
        )
        .await;
        assert_eq!(code, ErrorCode::DuplicateName);

        let code = fails(
            &app,
            method_names::CREATE_USER,
            json!({ "name": "Kim", "role": "Student", "password": PASSWORD, "UniId": 100 }),
        )
        .await;
        assert_eq!(code, ErrorCode::DuplicateUniversityId);
    }

    #[tokio::test]
    async fn test_user_lookup() {
        let (app, _) = setup(Config::development());
        let sam = create_student(&app, "Sam", 100).await;

        let by_id = ok(&app, method_names::USER, json!({ "id": sam })).await;
        let by_name = ok(&app, method_names::USER, json!({ "name": "Sam" })).await;
        assert_eq!(by_id, by_name);

        let code = fails(&app, method_names::USER, json!({ "id": sam, "name": "Sam" })).await;
        assert_eq!(code, ErrorCode::BadRequest);
        let code = fails(&app, method_names::USER, Value::Null).await;
        assert_eq!(code, ErrorCode::BadRequest);
        let code = fails(&app, method_names::USER, json!({ "name": "Nobody" })).await;
        assert_eq!(code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_role_lists_and_counts() {
        let (app, _) = setup(Config::development());
        create_admin(&app, "Dr.X").await;
        let sam = create_student(&app, "Sam", 100).await;
        create_student(&app, "Kim", 101).await;

        let users = ok(&app, method_names::USERS, Value::Null).await;
        let names: Vec<_> = users.as_array().unwrap().iter().map(|u| u["name"].clone()).collect();
        assert_eq!(names, vec![json!("Sam"), json!("Kim")]);
        let admins = ok(&app, method_names::ADMINS, Value::Null).await;
        assert_eq!(admins.as_array().unwrap().len(), 1);

        let project = ok(
            &app,
            method_names::CREATE_PROJECT,
            project_input("Dr.X", &[&sam], "2024-01-01", "2024-02-01"),
        )
        .await;
        ok(
            &app,
            method_names::UPDATE_PROJECT,
            json!({ "id": project["id"], "input": { "projectStatus": "Completed" } }),
        )
        .await;

        assert_eq!(count(&app, method_names::NUMBER_OF_STUDENTS).await, 2);
        assert_eq!(count(&app, method_names::NUMBER_OF_STUDENTS).await, 2);
        assert_eq!(count(&app, method_names::NUMBER_OF_PROJECTS).await, 1);
        assert_eq!(count(&app, method_names::NUMBER_OF_FINISHED_PROJECTS).await, 1);
        assert_eq!(count(&app, method_names::NUMBER_OF_TASKS).await, 0);
    }

    #[tokio::test]
    async fn test_admin_views() {
        let (app, _) = setup(Config::development());
        let admin = create_admin(&app, "Dr.X").await;
        let sam = create_student(&app, "Sam", 100).await;

        let project = ok(
            &app,
            method_names::CREATE_PROJECT,
            project_input("Dr.X", &[&sam], "2024-01-01", "2024-02-01"),
        )
        .await;
        let task = ok(
            &app,
            method_names::CREATE_TASK,
            json!({
                "projectTitle": project["id"],
                "taskName": "Draft",
                "description": "First draft",
                "assignedStudents": [sam],
                "dueDate": "2024-01-15T12:00:00Z",
            }),
        )
        .await;
        assert_eq!(task["status"], "Pending");
        assert_eq!(task["dueDate"], "2024-01-15T12:00:00.000Z");
        assert_eq!(task["projectTitle"]["projectTitle"], "Thesis");

        let by_admin = ok(
            &app,
            method_names::PROJECTS_BY_ADMIN,
            json!({ "adminName": "Dr.X" }),
        )
        .await;
        assert_eq!(by_admin[0]["tasks"][0]["id"], task["id"]);

        let project_tasks = ok(
            &app,
            method_names::TASKS_BY_ADMIN,
            json!({ "projectId": project["id"] }),
        )
        .await;
        let admin_tasks = ok(&app, method_names::ADMIN_TASKS, json!({ "adminId": admin })).await;
        assert_eq!(project_tasks, admin_tasks);

        let none = ok(
            &app,
            method_names::ADMIN_TASKS,
            json!({ "adminId": uuid::Uuid::new_v4().to_string() }),
        )
        .await;
        assert_eq!(none, json!([]));
    }

    #[tokio::test]
    async fn test_update_user_keeps_references_valid() {
        let (app, _) = setup(Config::development());
        let admin = create_admin(&app, "Dr.X").await;
        let sam = create_student(&app, "Sam", 100).await;
        ok(
            &app,
            method_names::CREATE_PROJECT,
            project_input("Dr.X", &[&sam], "2024-01-01", "2024-02-01"),
        )
        .await;

        let code = fails(
            &app,
            method_names::UPDATE_USER,
            json!({ "id": sam, "role": "Admin" }),
        )
        .await;
        assert_eq!(code, ErrorCode::RoleMismatch);

        let code = fails(
            &app,
            method_names::UPDATE_USER,
            json!({ "id": admin, "name": "Dr.Y" }),
        )
        .await;
        assert_eq!(code, ErrorCode::BadRequest);

        let renamed = ok(
            &app,
            method_names::UPDATE_USER,
            json!({ "id": sam, "name": "Samuel" }),
        )
        .await;
        assert_eq!(renamed["name"], "Samuel");
        assert_eq!(renamed["UniId"], 100);
    }

    #[tokio::test]
    async fn test_user_views_nest_assignments() {
        let (app, _) = setup(Config::development());
        create_admin(&app, "Dr.X").await;
        let sam = create_student(&app, "Sam", 100).await;
        let alex = create_student(&app, "Alex", 101).await;

        let project = ok(
            &app,
            method_names::CREATE_PROJECT,
            project_input("Dr.X", &[&sam], "2024-01-01", "2024-02-01"),
        )
        .await;
        let task = ok(
            &app,
            method_names::CREATE_TASK,
            json!({
                "projectTitle": project["id"],
                "taskName": "Draft",
                "description": "First draft",
                "assignedStudents": [sam],
                "dueDate": "2024-01-15",
            }),
        )
        .await;

        let found = ok(&app, method_names::USER, json!({ "id": sam })).await;
        assert_eq!(found["projects"][0]["id"], project["id"]);
        assert_eq!(found["projects"][0]["assignedStudents"][0]["id"], sam);
        assert!(found["projects"][0]["assignedStudents"][0].get("projects").is_none());
        assert_eq!(found["tasks"][0]["id"], task["id"]);

        let students = ok(&app, method_names::USERS, Value::Null).await;
        let unassigned = students
            .as_array()
            .unwrap()
            .iter()
            .find(|u| u["id"] == alex)
            .unwrap();
        assert_eq!(unassigned["projects"], json!([]));
        assert_eq!(unassigned["tasks"], json!([]));

        let admins = ok(&app, method_names::ADMINS, Value::Null).await;
        assert_eq!(admins[0]["projects"], json!([]));

        let session = ok(
            &app,
            method_names::LOGIN,
            json!({ "name": "Sam", "password": PASSWORD }),
        )
        .await;
        assert_eq!(session["user"]["tasks"][0]["taskName"], "Draft");
    }

    #[tokio::test]
    async fn test_messages_skip_dangling_participants() {
        let (app, state) = setup(Config::development());
        let alice = create_student(&app, "Alice", 1).await;
        let bob = create_student(&app, "Bob", 2).await;
        let alice_id = uuid::Uuid::parse_str(&alice).unwrap();
        let ghost = uuid::Uuid::new_v4();

        ok(
            &app,
            method_names::SEND_MESSAGE,
            json!({ "senderId": bob, "receiverId": alice, "message": "kept" }),
        )
        .await;
        state
            .store
            .create_message(ChatMessage::new(ghost, alice_id, "from nobody"))
            .await
            .unwrap();
        state
            .store
            .create_message(ChatMessage::new(alice_id, ghost, "to nobody"))
            .await
            .unwrap();

        let received = ok(
            &app,
            method_names::RECEIVED_MESSAGES,
            json!({ "receiverId": alice }),
        )
        .await;
        assert_eq!(received.as_array().unwrap().len(), 1);
        assert_eq!(received[0]["message"], "kept");

        let conversation = ok(
            &app,
            method_names::MESSAGES,
            json!({ "senderId": alice, "receiverId": ghost.to_string() }),
        )
        .await;
        assert_eq!(conversation, json!([]));
    }

    #[tokio::test]
    async fn test_updates_are_validated() {
        let (app, _) = setup(Config::development());
        create_admin(&app, "Dr.X").await;
        let sam = create_student(&app, "Sam", 100).await;
        let project = ok(
            &app,
            method_names::CREATE_PROJECT,
            project_input("Dr.X", &[&sam], "2024-01-01", "2024-02-01"),
        )
        .await;
        let task = ok(
            &app,
            method_names::CREATE_TASK,
            json!({
                "projectTitle": project["id"],
                "taskName": "Draft",
                "description": "First draft",
                "assignedStudents": [sam],
                "status": "In Progress",
                "dueDate": "2024-01-15",
            }),
        )
        .await;

        let code = fails(
            &app,
            method_names::UPDATE_PROJECT,
            json!({ "id": project["id"], "input": { "endDate": "2023-12-01" } }),
        )
        .await;
        assert_eq!(code, ErrorCode::DateRangeInvalid);

        let ghost = uuid::Uuid::new_v4().to_string();
        let code = fails(
            &app,
            method_names::UPDATE_TASK,
            json!({ "id": task["id"], "assignedStudents": [sam, ghost] }),
        )
        .await;
        assert_eq!(code, ErrorCode::ReferenceNotFound);

        // Rejected updates leave the stored records untouched.
        let stored = ok(&app, method_names::PROJECT, json!({ "id": project["id"] })).await;
        assert_eq!(stored["endDate"], "2024-02-01");
        let stored = ok(&app, method_names::TASK, json!({ "id": task["id"] })).await;
        assert_eq!(stored["assignedStudents"].as_array().unwrap().len(), 1);

        // A blank status keeps the current one.
        let updated = ok(
            &app,
            method_names::UPDATE_TASK,
            json!({ "id": task["id"], "status": "" }),
        )
        .await;
        assert_eq!(updated["status"], "In Progress");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let (app, _) = setup(Config::development());
        let code = fails(&app, "deleteEverything", Value::Null).await;
        assert_eq!(code, ErrorCode::MethodNotFound);
    }

    #[tokio::test]
    async fn test_invalid_bearer_token_is_rejected() {
        let (app, _) = setup(Config::development());
        let (status, body) = post_rpc(&app, Some("not-a-token"), method_names::USERS, Value::Null).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], ErrorCode::AuthenticationError as i32);
    }

    #[tokio::test]
    async fn test_require_auth() {
        let config = Config {
            require_auth: true,
            ..Config::development()
        };
        let (app, _) = setup(config);
        create_student(&app, "Sam", 100).await;

        let code = fails(&app, method_names::USERS, Value::Null).await;
        assert_eq!(code, ErrorCode::AuthenticationError);

        let session = ok(
            &app,
            method_names::LOGIN,
            json!({ "name": "Sam", "password": PASSWORD }),
        )
        .await;
        let token = session["token"].as_str().unwrap();

        let (status, body) = post_rpc(&app, Some(token), method_names::USERS, Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"][0]["name"], "Sam");
    }
}
