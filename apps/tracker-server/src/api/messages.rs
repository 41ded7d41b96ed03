//! Chat history and message sending.

use entities::ChatMessage;
use entity_store::{EntityStore, MessageFilter};
use rpc_protocol::{
    ChatMessageView, DeliveryPayload, MessagesRequest, ReceivedMessagesRequest, SendMessageRequest,
    SentMessageResponse, MESSAGE_SENT,
};

use crate::{
    api::convert::{message_view, message_views, parse_id},
    error::{ServerError, ServerResult},
    services::presence::Delivery,
    state::AppState,
};

/// `messages(senderId, receiverId)`: the conversation between two users in
/// both directions, oldest first.
pub async fn messages<S: EntityStore>(
    state: &AppState<S>,
    req: MessagesRequest,
) -> ServerResult<Vec<ChatMessageView>> {
    let sender_id = parse_id("senderId", &req.sender_id)?;
    let receiver_id = parse_id("receiverId", &req.receiver_id)?;

    let messages = state
        .store
        .list_messages(MessageFilter::between(sender_id, receiver_id))
        .await?;
    message_views(&state.store, messages).await
}

/// `receivedMessages(receiverId)`.
pub async fn received_messages<S: EntityStore>(
    state: &AppState<S>,
    req: ReceivedMessagesRequest,
) -> ServerResult<Vec<ChatMessageView>> {
    let receiver_id = parse_id("receiverId", &req.receiver_id)?;

    let messages = state
        .store
        .list_messages(MessageFilter::received_by(receiver_id))
        .await?;
    message_views(&state.store, messages).await
}

/// `sendMessage(senderId, receiverId, message)`.
///
/// The message is persisted once validated. Pushing it to the receiver's
/// live connection is best effort and never fails the call.
pub async fn send_message<S: EntityStore>(
    state: &AppState<S>,
    req: SendMessageRequest,
) -> ServerResult<SentMessageResponse> {
    let sender_id = parse_id("senderId", &req.sender_id)?;
    let receiver_id = parse_id("receiverId", &req.receiver_id)?;
    let text = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ServerError::bad_request("message is required"))?;

    let candidate = ChatMessage::new(sender_id, receiver_id, text);
    let (sender, receiver) = state.validator().validate_message_write(&candidate).await?;
    let message = state.store.create_message(candidate).await?;

    let payload = DeliveryPayload {
        sender: sender.id.to_string(),
        message: message.message.clone(),
    };
    match state.presence.deliver(receiver.id, &payload).await {
        Delivery::Delivered => {
            tracing::debug!(message_id = %message.id, receiver_id = %receiver.id, "Message pushed");
        }
        outcome => {
            tracing::warn!(
                message_id = %message.id,
                receiver_id = %receiver.id,
                outcome = ?outcome,
                "Message stored without live delivery"
            );
        }
    }

    tracing::info!(message_id = %message.id, sender_id = %sender.id, "Message sent");
    Ok(SentMessageResponse {
        message: MESSAGE_SENT.to_string(),
        sent_message: Some(message_view(&message, &sender, &receiver)),
    })
}
