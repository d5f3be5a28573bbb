//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `websocket`: Presence Registry 上の WebSocket 接続へ JSON フレームを送る実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
