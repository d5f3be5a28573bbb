//! HTTP and WebSocket handlers.

mod auth;
mod http;
mod websocket;

pub use http::{get_chats, get_history, get_media, health_check, upload_attachment};
pub use websocket::websocket_handler;
