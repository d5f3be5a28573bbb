//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::{MessageDto, ProfileDto};

/// Query parameters of the history endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

/// One page of room history, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponseDto {
    pub messages: Vec<MessageDto>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatListEntryDto {
    pub room_id: String,
    pub user: ProfileDto,
    pub last_message: String,
    pub last_message_time: String,
    pub last_message_timestamp: i64,
    pub unread_count: usize,
}

/// Query parameters of the upload endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
}
