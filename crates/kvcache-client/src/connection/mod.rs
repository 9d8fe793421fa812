//! # Connection Module
//!
//! Connection parameters, TLS material and the per-kind handle supervisor.

pub mod options;
pub mod supervisor;
pub mod tls;

pub use options::{ClusterOptions, ConnectionOptions, ConnectionSource};
pub use supervisor::{ConnectionState, Supervisor};
pub use tls::TlsMaterial;
