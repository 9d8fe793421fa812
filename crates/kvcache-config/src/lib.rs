//! # kvcache Configuration
//!
//! YAML-backed configuration for the kvcache client.
//!
//! ```yaml
//! cache:
//!   redis:
//!     url: ""                    # takes precedence over address when set
//!     address: "127.0.0.1:6379"
//!     username: ""
//!     password: ""
//!     db: 0
//!     expiration: 300            # seconds, 0 = never expire
//!     clusterAddress: []
//!     healthCheckInterval: 5     # seconds
//!     timeout: 3000              # milliseconds
//!     tls:
//!       enabled: false
//!       cert: certs/redis_user.crt
//!       key: certs/redis_user_private.key
//!       ca: certs/redis_ca.pem
//! database:
//!   mysql:
//!     host: ""
//!     username: ""
//!     password: ""
//!     db: ""
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kvcache_config::get_config;
//!
//! let config = get_config()?;
//! println!("{}", config.redis().address);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod model;
pub mod store;

pub use error::{ConfigError, Result};
pub use model::{
    CacheSection, Config, DatabaseSection, MySqlSettings, RedisSettings, TlsSettings,
};
pub use store::{CONFIG_PATH_ENV, ConfigStore, DEFAULT_CONFIG_FILE, get_config, load_config};
