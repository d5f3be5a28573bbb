//! Repository の実装
//!
//! - `inmemory`: 単一プロセス向けのインメモリ実装（メッセージストア、ユーザーディレクトリ）

pub mod inmemory;

pub use inmemory::{InMemoryMessageRepository, InMemoryUserDirectory};
