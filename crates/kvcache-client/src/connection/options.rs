//! Connection parameter building.
//!
//! Turns configuration into `redis` connection parameters without touching
//! the network, so the chosen path can be inspected before connecting.

use kvcache_config::RedisSettings;
use redis::{ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo};

use crate::error::{CacheError, Result};

const DEFAULT_PORT: u16 = 6379;

/// How the single-node parameters were derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionSource {
    /// Parsed from `url`
    Url,
    /// Composed from `address`, credentials and `db`
    Address,
}

/// Parameters for a single-node session
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub source: ConnectionSource,
    pub info: ConnectionInfo,
}

impl ConnectionOptions {
    /// Build single-node parameters from settings.
    ///
    /// A non-empty `url` wins; otherwise `address`, `username`, `password`
    /// and `db` are composed. With TLS enabled the address is always a TLS
    /// address, whichever path was taken.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidUrl`] or [`CacheError::InvalidAddress`].
    pub fn from_settings(settings: &RedisSettings) -> Result<Self> {
        let (source, mut info) = if settings.url.is_empty() {
            let (host, port) = parse_address(&settings.address)?;
            let info = ConnectionInfo {
                addr: ConnectionAddr::Tcp(host, port),
                redis: RedisConnectionInfo {
                    db: settings.db,
                    username: non_empty(&settings.username),
                    password: non_empty(&settings.password),
                    ..Default::default()
                },
            };
            (ConnectionSource::Address, info)
        } else {
            let info = settings
                .url
                .as_str()
                .into_connection_info()
                .map_err(|e| CacheError::InvalidUrl(e.to_string()))?;
            (ConnectionSource::Url, info)
        };

        if settings.tls.enabled {
            info.addr = into_tls(info.addr);
        }

        Ok(Self { source, info })
    }

    #[must_use]
    pub const fn uses_tls(&self) -> bool {
        matches!(self.info.addr, ConnectionAddr::TcpTls { .. })
    }
}

/// Parameters for a cluster session
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    pub nodes: Vec<ConnectionInfo>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tls: bool,
}

impl ClusterOptions {
    /// Build cluster parameters from `clusterAddress` and the shared credentials.
    ///
    /// Entries may be bare `host:port` pairs or full URLs.
    ///
    /// # Errors
    ///
    /// [`CacheError::NoClusterNodes`] for an empty list, otherwise the parse
    /// error of the first bad entry.
    pub fn from_settings(settings: &RedisSettings) -> Result<Self> {
        if settings.cluster_address.is_empty() {
            return Err(CacheError::NoClusterNodes);
        }

        let nodes = settings
            .cluster_address
            .iter()
            .map(|node| parse_node(node))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            nodes,
            username: non_empty(&settings.username),
            password: non_empty(&settings.password),
            tls: settings.tls.enabled,
        })
    }
}

fn parse_node(node: &str) -> Result<ConnectionInfo> {
    if node.contains("://") {
        return node
            .into_connection_info()
            .map_err(|e| CacheError::InvalidUrl(format!("{node}: {e}")));
    }
    let (host, port) = parse_address(node)?;
    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host, port),
        redis: RedisConnectionInfo::default(),
    })
}

/// Split `host:port`, `host` or `[v6]:port` into its parts
fn parse_address(address: &str) -> Result<(String, u16)> {
    let address = address.trim();
    if address.is_empty() {
        return Err(CacheError::InvalidAddress("empty address".to_string()));
    }

    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| CacheError::InvalidAddress(address.to_string()))?;
        (host, tail.strip_prefix(':'))
    } else {
        match address.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => (host, Some(port)),
            _ => (address, None),
        }
    };

    if host.is_empty() {
        return Err(CacheError::InvalidAddress(address.to_string()));
    }

    let port = match port {
        Some(port) => port
            .parse::<u16>()
            .map_err(|_| CacheError::InvalidAddress(address.to_string()))?,
        None => DEFAULT_PORT,
    };

    Ok((host.to_string(), port))
}

fn into_tls(addr: ConnectionAddr) -> ConnectionAddr {
    match addr {
        ConnectionAddr::Tcp(host, port) => ConnectionAddr::TcpTls {
            host,
            port,
            insecure: false,
            tls_params: None,
        },
        other => other,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
