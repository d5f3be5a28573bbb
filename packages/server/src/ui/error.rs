//! HTTP error responses.
//!
//! Every failure is returned as `{ "error": <code>, "message": <text> }`.

use axum::{
    Json,
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::AuthError,
    infrastructure::dto::http::ErrorResponseDto,
    usecase::{GetChatListError, GetHistoryError, SessionError, UploadError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "notFound", message)
    }

    /// Body extraction failure. Exceeding the route's body limit is reported
    /// the same way as an oversized upload caught by the use case.
    pub fn from_body_rejection(rejection: BytesRejection, max_bytes: usize) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => UploadError::TooLarge { max: max_bytes }.into(),
            status => Self::new(status, "invalidBody", rejection.body_text()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{} {}: {}", self.status, self.code, self.message);
        } else {
            tracing::debug!("{} {}: {}", self.status, self.code, self.message);
        }

        let body = ErrorResponseDto {
            error: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingCredential | AuthError::InvalidCredential => {
                Self::new(StatusCode::UNAUTHORIZED, "unauthorized", e.to_string())
            }
            AuthError::Unavailable(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "authUnavailable", e.to_string())
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalidQuery", rejection.body_text())
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Authentication(auth) => auth.into(),
            other => Self::new(StatusCode::BAD_REQUEST, "invalidEvent", other.to_string()),
        }
    }
}

impl From<GetHistoryError> for ApiError {
    fn from(e: GetHistoryError) -> Self {
        let (status, code) = match &e {
            GetHistoryError::InvalidRoom(_) => (StatusCode::BAD_REQUEST, "invalidRoom"),
            GetHistoryError::InvalidCursor(_) => (StatusCode::BAD_REQUEST, "invalidCursor"),
            GetHistoryError::AccessDenied(_) => (StatusCode::FORBIDDEN, "accessDenied"),
            GetHistoryError::Persistence(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "persistenceError")
            }
        };
        Self::new(status, code, e.to_string())
    }
}

impl From<GetChatListError> for ApiError {
    fn from(e: GetChatListError) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "persistenceError", e.to_string())
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        let (status, code) = match &e {
            UploadError::EmptyFile => (StatusCode::BAD_REQUEST, "emptyFile"),
            UploadError::MissingFileName => (StatusCode::BAD_REQUEST, "missingFileName"),
            UploadError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "fileTooLarge"),
            UploadError::UnsupportedType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupportedFileType")
            }
            UploadError::Storage(_) => (StatusCode::SERVICE_UNAVAILABLE, "storageError"),
        };
        Self::new(status, code, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::dto::http::HistoryQuery;
    use axum::extract::Query;

    #[test]
    fn test_history_errors_map_to_status_codes() {
        // テスト項目: 履歴取得のエラーが適切な HTTP ステータスに変換される
        let denied = ApiError::from(GetHistoryError::AccessDenied("u3".into()));
        let invalid = ApiError::from(GetHistoryError::InvalidRoom("x".into()));
        let store = ApiError::from(GetHistoryError::Persistence("down".into()));

        assert_eq!((denied.status(), denied.code()), (StatusCode::FORBIDDEN, "accessDenied"));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_auth_and_upload_errors_map_to_status_codes() {
        // テスト項目: 認証・アップロードのエラーが 401 / 413 / 415 に変換される
        let auth = ApiError::from(SessionError::Authentication(AuthError::InvalidCredential));
        let large = ApiError::from(UploadError::TooLarge { max: 1 });
        let kind = ApiError::from(UploadError::UnsupportedType("text/html".into()));

        assert_eq!(auth.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(large.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(kind.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_malformed_query_maps_to_invalid_query() {
        // テスト項目: クエリ文字列の解析失敗は JSON で返す 400 invalidQuery になる
        // given (前提条件):
        let uri = "/api/rooms/room:u1:u2/messages?limit=abc".parse().unwrap();
        let rejection = Query::<HistoryQuery>::try_from_uri(&uri).unwrap_err();

        // when (操作):
        let error = ApiError::from(rejection);

        // then (期待する結果):
        assert_eq!(
            (error.status(), error.code()),
            (StatusCode::BAD_REQUEST, "invalidQuery")
        );
    }
}
