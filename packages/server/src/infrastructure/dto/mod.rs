//! Data Transfer Objects (DTOs) for the chat server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event DTOs
//! - `http`: HTTP API request/response DTOs
//! - `conversion`: conversions between DTOs and domain entities

pub mod conversion;
pub mod http;
pub mod websocket;
