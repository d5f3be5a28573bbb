//! Bearer credential extraction.
//!
//! Credentials arrive as `Authorization: Bearer <token>` or, for clients that
//! cannot set headers on a WebSocket upgrade, as `?token=<token>`.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;

use crate::{domain::Identity, ui::error::ApiError, ui::state::AppState};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Credential carried by a request, header first.
pub fn credential_from_parts(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(|token| token.trim().to_string());

    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.token)
    })
}

/// Identity of the caller, resolved through the authenticator.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let credential = credential_from_parts(parts)
            .ok_or(crate::domain::AuthError::MissingCredential)?;
        let identity = state
            .session_context
            .authenticator
            .authenticate(&credential)
            .await?;
        Ok(AuthenticatedUser(identity))
    }
}
