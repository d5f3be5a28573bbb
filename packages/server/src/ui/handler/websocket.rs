//! WebSocket connection handlers.
//!
//! The upgrade is authenticated first; a missing or invalid credential is
//! answered with HTTP 401 and never reaches the presence registry. After the
//! upgrade, every inbound frame is decoded into a [`SessionCommand`] and the
//! reply (if any) is queued on the same channel that carries server pushes.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::request::Parts,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::Attachment,
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
    ui::{error::ApiError, state::AppState},
    usecase::{
        ConnectionSession, SendMessageError, SendMessageRequest, SessionCommand, SessionError,
        SessionReply,
    },
};

use super::auth::credential_from_parts;

pub async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    parts: Parts,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let mut session = ConnectionSession::new(state.session_context.clone());
    let identity = session
        .authenticate(credential_from_parts(&parts).as_deref())
        .await?;
    tracing::info!("Upgrading connection for '{}'", identity.user_id);

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, session)))
}

/// Spawns a task that forwards queued frames to the WebSocket sender.
///
/// Frames come from the connection's channel: pushes from other sessions
/// (via the presence registry) and replies to this client's own events.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

async fn handle_socket(socket: WebSocket, mut session: ConnectionSession) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let user = session
        .identity()
        .map(|identity| identity.user_id.to_string())
        .unwrap_or_default();

    if let Err(e) = session.activate(tx.clone()).await {
        tracing::error!("Failed to activate session for '{}': {}", user, e);
        return;
    }
    let mut send_task = pusher_loop(rx, sender);

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = dispatch(&mut session, text.as_str()).await {
                        match serde_json::to_string(&reply) {
                            Ok(json) => {
                                if tx.send(json).is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::error!("Failed to encode reply for '{}': {}", user, e),
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("'{}' closed the connection", user);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error from '{}': {}", user, e);
                    break;
                }
            },
            _ = &mut send_task => {
                tracing::debug!("Outbound stream of '{}' ended", user);
                break;
            }
        }
    }

    send_task.abort();
    session.close().await;
    tracing::info!("Session of '{}' closed", user);
}

/// Handle one inbound frame. Returns the event to send back, if any.
async fn dispatch(session: &mut ConnectionSession, text: &str) -> Option<ServerEvent> {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!("Rejected frame: {}", e);
            return Some(ServerEvent::error("invalidEvent", e.to_string()));
        }
    };

    let command = match into_command(event) {
        Ok(command) => command,
        Err(reply) => return Some(reply),
    };

    match session.handle(command).await {
        Ok(SessionReply::UserFound(profile)) => Some(ServerEvent::UserFound {
            profile: profile.into(),
        }),
        Ok(SessionReply::UserNotFound) => Some(ServerEvent::UserNotFound),
        // 送信者へのエコーは配信パイプラインがプッシュ済み
        Ok(SessionReply::MessageSent(_)) | Ok(SessionReply::RoomJoined(_)) => None,
        Err(e) => Some(error_event(&e)),
    }
}

fn into_command(event: ClientEvent) -> Result<SessionCommand, ServerEvent> {
    Ok(match event {
        ClientEvent::Search { handle } => SessionCommand::SearchUser { handle },
        ClientEvent::Send {
            receiver_id,
            content,
            kind,
            attachment,
        } => {
            let attachment = attachment
                .map(Attachment::try_from)
                .transpose()
                .map_err(|e| ServerEvent::error("invalidContent", e.to_string()))?;
            SessionCommand::SendMessage(SendMessageRequest {
                receiver_id,
                content,
                kind,
                attachment,
            })
        }
        ClientEvent::JoinRoom { room_id } => SessionCommand::JoinRoom { room_id },
    })
}

fn error_event(error: &SessionError) -> ServerEvent {
    let code = match error {
        SessionError::Send(SendMessageError::InvalidRecipient(_)) => "invalidRecipient",
        SessionError::Send(SendMessageError::InvalidContent(_)) => "invalidContent",
        SessionError::Send(SendMessageError::Persistence(_)) => "persistenceError",
        SessionError::InvalidRoom(_) => "invalidRoom",
        SessionError::AccessDenied(_) => "accessDenied",
        SessionError::Authentication(_) | SessionError::InvalidState { .. } => "invalidEvent",
    };
    ServerEvent::error(code, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::dto::websocket::AttachmentDto;

    #[test]
    fn test_send_event_with_unknown_attachment_category_is_rejected() {
        // テスト項目: 添付ファイルのカテゴリが不正な send イベントは invalidContent になる
        // given (前提条件):
        let event = ClientEvent::Send {
            receiver_id: "u2".to_string(),
            content: None,
            kind: None,
            attachment: Some(AttachmentDto {
                url: "u".to_string(),
                mime_category: "audio".to_string(),
                file_name: "a.mp3".to_string(),
                size: 1,
            }),
        };

        // when (操作):
        let result = into_command(event);

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ServerEvent::Error { ref code, .. }) if code == "invalidContent"
        ));
    }

    #[test]
    fn test_session_errors_map_to_event_codes() {
        // テスト項目: セッションのエラーがクライアント向けのエラーコードに変換される
        let cases = [
            (
                SessionError::Send(SendMessageError::InvalidRecipient("self".into())),
                "invalidRecipient",
            ),
            (
                SessionError::Send(SendMessageError::Persistence("down".into())),
                "persistenceError",
            ),
            (SessionError::InvalidRoom("x".into()), "invalidRoom"),
            (SessionError::AccessDenied("u3".into()), "accessDenied"),
        ];

        for (error, expected) in cases {
            match error_event(&error) {
                ServerEvent::Error { code, .. } => assert_eq!(code, expected),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }
}
