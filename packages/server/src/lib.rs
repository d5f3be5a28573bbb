//! One-to-one real-time chat server.
//!
//! Layered as:
//!
//! - `domain`: value objects, entities and the gateway traits
//! - `usecase`: one struct per operation, plus the connection session
//! - `infrastructure`: in-memory gateways, DTOs and the WebSocket pusher
//! - `ui`: axum routes, configuration and application wiring

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
