//! Infrastructure layer
//!
//! ドメイン層が定義する trait の具体的な実装と、通信プロトコルごとの DTO を提供します。

pub mod auth;
pub mod dto;
pub mod message_pusher;
pub mod presence;
pub mod repository;
pub mod seed;
pub mod storage;
pub mod timeout;
