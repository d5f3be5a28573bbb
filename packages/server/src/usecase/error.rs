//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::AuthError;

use super::session::SessionState;

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// 宛先が不正（自分自身、または不正な ID）
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// 本文も添付ファイルもない、または本文・種別が不正
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// メッセージストアへの書き込みに失敗
    #[error("failed to persist message: {0}")]
    Persistence(String),
}

/// 履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetHistoryError {
    #[error("invalid room: {0}")]
    InvalidRoom(String),

    /// 閲覧者がルームの参加者ではない
    #[error("user '{0}' is not a participant of this room")]
    AccessDenied(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("failed to query messages: {0}")]
    Persistence(String),
}

/// チャット一覧取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetChatListError {
    #[error("failed to load rooms: {0}")]
    Persistence(String),
}

/// 添付ファイルアップロードのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("no file uploaded")]
    EmptyFile,

    #[error("file name is required")]
    MissingFileName,

    #[error("file exceeds {max} bytes")]
    TooLarge { max: usize },

    #[error("file type '{0}' is not allowed")]
    UnsupportedType(String),

    #[error("failed to store file: {0}")]
    Storage(String),
}

/// 接続セッションのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),

    #[error("session is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },

    #[error("invalid room: {0}")]
    InvalidRoom(String),

    #[error("user '{0}' is not a participant of this room")]
    AccessDenied(String),

    #[error(transparent)]
    Send(#[from] SendMessageError),
}
