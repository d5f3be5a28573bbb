//! Presence Registry の実装
//!
//! - `inmemory`: 単一プロセス向けのインメモリ実装

pub mod inmemory;

pub use inmemory::InMemoryPresenceRegistry;
