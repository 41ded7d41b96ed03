//! RPC response types.

use serde::{Deserialize, Serialize};

/// A user as returned to callers. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub role: String,
    /// Set for students only.
    #[serde(rename = "UniId")]
    pub uni_id: Option<i64>,
}

/// A user together with the projects and tasks they are assigned to.
///
/// Users nested inside projects, tasks and messages are plain [`UserView`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetailView {
    #[serde(flatten)]
    pub user: UserView,
    pub projects: Vec<ProjectView>,
    pub tasks: Vec<TaskView>,
}

/// The `{id, projectTitle}` pair nested in tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub id: String,
    pub project_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: String,
    pub task_name: String,
    pub description: String,
    pub status: String,
    /// RFC 3339 timestamp with milliseconds.
    pub due_date: String,
    /// `None` if the parent project no longer resolves.
    pub project_title: Option<ProjectRef>,
    pub assigned_students: Vec<UserView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: String,
    pub project_title: String,
    pub project_description: String,
    pub category: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// `YYYY-MM-DD`.
    pub end_date: String,
    pub project_status: String,
    pub assigned_students: Vec<UserView>,
    pub admin_name: String,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageView {
    pub id: String,
    pub sender: UserView,
    pub receiver: UserView,
    pub message: String,
    /// RFC 3339 timestamp with milliseconds.
    pub timestamp: String,
}

/// Result of `login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserDetailView,
}

/// Result of `sendMessage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessageResponse {
    pub message: String,
    pub sent_message: Option<ChatMessageView>,
}

/// Text of a successful `sendMessage` acknowledgement.
pub const MESSAGE_SENT: &str = "Message sent";

/// Frame pushed over the live connection to the receiver of a new message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    /// Id of the sending user.
    pub sender: String,
    /// Message text.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_view_wire_names() {
        let view = UserView {
            id: "1".into(),
            name: "Sam".into(),
            role: "Student".into(),
            uni_id: Some(100),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["UniId"], 100);
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_user_detail_flattens_user() {
        let view = UserDetailView {
            user: UserView {
                id: "1".into(),
                name: "Dr.X".into(),
                role: "Admin".into(),
                uni_id: None,
            },
            projects: Vec::new(),
            tasks: Vec::new(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Dr.X");
        assert!(json["UniId"].is_null());
        assert_eq!(json["projects"], serde_json::json!([]));
        assert_eq!(json["tasks"], serde_json::json!([]));
        assert!(json.get("user").is_none());
    }

    #[test]
    fn test_sent_message_wire_names() {
        let response = SentMessageResponse {
            message: MESSAGE_SENT.into(),
            sent_message: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], "Message sent");
        assert!(json["sentMessage"].is_null());
    }

    #[test]
    fn test_delivery_payload_shape() {
        let payload = DeliveryPayload {
            sender: "abc".into(),
            message: "hi".into(),
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"sender":"abc","message":"hi"}"#
        );
    }
}
