//! # Transport Module
//!
//! Handle/connector seams and their Redis implementations.

pub mod redis_impl;
pub mod traits;

pub use redis_impl::{
    ClusterConnector, ClusterHandle, RedisHandle, SingleNodeConnector, SingleNodeHandle,
};
pub use traits::{CacheHandle, Connector, HandleKind};
