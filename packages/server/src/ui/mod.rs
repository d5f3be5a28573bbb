//! HTTP and WebSocket surface of the chat server.

pub mod config;
pub mod error;
mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
