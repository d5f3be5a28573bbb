//! Domain errors.

use std::time::Duration;

use thiserror::Error;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("user id exceeds {max} characters")]
    UserIdTooLong { max: usize },

    #[error("user id must not contain '{0}'")]
    InvalidUserIdChar(char),

    #[error("handle must be {min} to {max} characters of [A-Za-z0-9_]")]
    InvalidHandle { min: usize, max: usize },

    #[error("message content exceeds {max} characters")]
    ContentTooLong { max: usize },

    #[error("invalid message id: {0}")]
    InvalidMessageId(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("unknown message kind: {0}")]
    UnknownMessageKind(String),
}

/// Room identifier errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomIdError {
    /// Both participants are the same user
    #[error("a room requires two distinct participants")]
    SelfChat,

    /// The identifier does not follow `room:<a>:<b>`
    #[error("malformed room id: {0}")]
    Malformed(String),
}

/// Message store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("message store unavailable: {0}")]
    Unavailable(String),

    #[error("message store did not answer within {0:?}")]
    Timeout(Duration),
}

/// User directory errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("user directory unavailable: {0}")]
    Unavailable(String),

    #[error("user directory did not answer within {0:?}")]
    Timeout(Duration),
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no credential provided")]
    MissingCredential,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}

/// Object storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("object storage unavailable: {0}")]
    Unavailable(String),

    #[error("object storage did not answer within {0:?}")]
    Timeout(Duration),
}

/// Errors raised while pushing to live connections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' is not connected")]
    ClientNotFound(String),

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error("failed to encode notification: {0}")]
    Encode(String),
}
