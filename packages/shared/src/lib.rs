//! Utilities shared by the tegami packages: logging setup and clock abstraction.

pub mod logger;
pub mod time;
