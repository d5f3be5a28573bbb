//! WebSocket event DTOs.
//!
//! Every frame is a JSON object tagged by `type`.

use serde::{Deserialize, Serialize};

/// Public profile as sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: String,
    pub name: String,
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Attachment descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDto {
    pub url: String,
    pub mime_category: String,
    pub file_name: String,
    pub size: u64,
}

/// Message as pushed to clients and returned by the history query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub room_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentDto>,
    /// Unix milliseconds
    pub timestamp: i64,
    /// RFC 3339 rendering of `timestamp`
    pub created_at: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<ProfileDto>,
}

/// Client → Server events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    Search {
        handle: String,
    },
    #[serde(rename_all = "camelCase")]
    Send {
        receiver_id: String,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        kind: Option<String>,
        #[serde(default)]
        attachment: Option<AttachmentDto>,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
    },
}

/// Server → Client events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    UserOnline { user_id: String, handle: String },
    #[serde(rename_all = "camelCase")]
    UserOffline { user_id: String, handle: String },
    UserFound { profile: ProfileDto },
    UserNotFound,
    MessageReceived { message: MessageDto },
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_send_event_defaults_optional_fields() {
        // テスト項目: send イベントの省略可能なフィールドは None になる
        // given (前提条件):
        let json = r#"{"type":"send","receiverId":"u2","content":"hi"}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::Send {
                receiver_id: "u2".to_string(),
                content: Some("hi".to_string()),
                kind: None,
                attachment: None,
            }
        );
    }

    #[test]
    fn test_client_join_room_event() {
        // テスト項目: joinRoom イベントがパースできる
        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"joinRoom","roomId":"room:u1:u2"}"#).unwrap();

        assert_eq!(
            event,
            ClientEvent::JoinRoom {
                room_id: "room:u1:u2".to_string()
            }
        );
    }

    #[test]
    fn test_server_events_are_tagged_in_camel_case() {
        // テスト項目: サーバーイベントは camelCase の type タグ付きで出力される
        // given (前提条件):
        let online = ServerEvent::UserOnline {
            user_id: "u1".to_string(),
            handle: "alice".to_string(),
        };

        // when (操作):
        let online_json = serde_json::to_value(&online).unwrap();
        let not_found_json = serde_json::to_value(&ServerEvent::UserNotFound).unwrap();

        // then (期待する結果):
        assert_eq!(
            online_json,
            serde_json::json!({"type": "userOnline", "userId": "u1", "handle": "alice"})
        );
        assert_eq!(not_found_json, serde_json::json!({"type": "userNotFound"}));
    }

    #[test]
    fn test_unknown_client_event_is_rejected() {
        // テスト項目: 未知の type を持つイベントはパースに失敗する
        let result = serde_json::from_str::<ClientEvent>(r#"{"type":"typing"}"#);

        assert!(result.is_err());
    }
}
