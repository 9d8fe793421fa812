//! kvcache command-line client
//!
//! Thin wrapper over [`kvcache_client::CacheManager`] for poking at a cache
//! from a shell.

pub mod cli;
pub mod commands;

pub use cli::{Args, Command};
pub use commands::{Outcome, execute};
