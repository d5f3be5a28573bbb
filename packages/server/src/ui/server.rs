//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        get_chats, get_history, get_media, health_check, upload_attachment, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat server
///
/// # Example
///
/// ```ignore
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// let state = AppState::in_memory(&config, seed, "http://127.0.0.1:8080");
/// Server::new(Arc::new(state)).serve(listener).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Build the router with every endpoint.
    pub fn router(&self) -> Router {
        // 上限ちょうどのファイルを受け付けるため 1 バイト余裕を持たせ、超過はユースケース側で 413 にする
        let upload_limit = self.state.upload_attachment_usecase.max_bytes() + 1;

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/chats", get(get_chats))
            .route("/api/rooms/{room_id}/messages", get(get_history))
            .route(
                "/api/uploads",
                post(upload_attachment).layer(DefaultBodyLimit::max(upload_limit)),
            )
            .route("/media/{object_id}", get(get_media))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until a shutdown signal arrives.
    pub async fn serve(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let local_addr = listener.local_addr()?;
        tracing::info!("Chat server listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}/ws?token=<token>", local_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
