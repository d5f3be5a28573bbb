//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{BytesRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::{
        http::{ChatListEntryDto, HistoryQuery, HistoryResponseDto, UploadQuery},
        websocket::{AttachmentDto, MessageDto},
    },
    ui::{error::ApiError, state::AppState},
};

use super::auth::AuthenticatedUser;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let online = state.presence.online_user_ids().await.len();
    Json(serde_json::json!({"status": "ok", "online": online}))
}

/// Get one page of a room's history (oldest first)
///
/// Messages addressed to the caller are marked delivered as a side effect.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(room_id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponseDto>, ApiError> {
    let Query(query) = query?;
    let page = state
        .get_history_usecase
        .execute(
            &identity.user_id,
            &room_id,
            query.limit,
            query.cursor.as_deref(),
        )
        .await?;

    // Domain Model から DTO への変換
    Ok(Json(HistoryResponseDto {
        messages: page.messages.into_iter().map(MessageDto::from).collect(),
        has_more: page.has_more,
        next_cursor: page.next_cursor.map(|cursor| cursor.to_string()),
    }))
}

/// Get the caller's chat list, newest activity first
pub async fn get_chats(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Vec<ChatListEntryDto>>, ApiError> {
    let entries = state
        .get_chat_list_usecase
        .execute(&identity.user_id)
        .await?;
    Ok(Json(entries.into_iter().map(ChatListEntryDto::from).collect()))
}

/// Upload an attachment as the raw request body
pub async fn upload_attachment(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    query: Result<Query<UploadQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AttachmentDto>, ApiError> {
    let Query(query) = query?;
    let max_bytes = state.upload_attachment_usecase.max_bytes();
    let body = body.map_err(|rejection| ApiError::from_body_rejection(rejection, max_bytes))?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(FALLBACK_CONTENT_TYPE);
    let file_name = query.filename.unwrap_or_default();
    tracing::debug!(
        "'{}' uploads '{}' ({}, {} bytes)",
        identity.user_id,
        file_name,
        content_type,
        body.len()
    );

    let attachment = state
        .upload_attachment_usecase
        .execute(&file_name, content_type, body.to_vec())
        .await?;
    Ok(Json(attachment.into()))
}

/// Serve an object stored by the in-memory object storage
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(object_id): Path<String>,
) -> Result<Response, ApiError> {
    let blob = state
        .media
        .get(&object_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("no object '{object_id}'")))?;

    let content_type = HeaderValue::from_str(&blob.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
    Ok(([(CONTENT_TYPE, content_type)], blob.bytes).into_response())
}
