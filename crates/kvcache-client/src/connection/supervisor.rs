//! # Handle Supervisor
//!
//! Owns at most one handle of a single kind. The handle is created on first
//! access, re-checked once its last successful health check is older than the
//! configured interval, and rebuilt when the check fails.
//!
//! ```text
//! Absent ──connect──▶ Connected ──check fails──▶ Reconnecting ──connect──▶ Connected
//!   ▲                    │                           │
//!   └── connect fails ───┘ (never)                   └── connect fails: stays Reconnecting
//! ```
//!
//! Fresh handles are served under a shared read lock. Health checks and
//! connecting take the write lock, so at most one connect is in flight per
//! supervisor.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::{CacheError, Result};
use crate::transport::{CacheHandle, Connector, HandleKind};

/// Observable lifecycle state of a supervised handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Absent,
    Connected,
    Reconnecting,
}

enum HandleState<H> {
    Absent,
    Connected { handle: Arc<H>, checked_at: Instant },
    Reconnecting,
}

impl<H> HandleState<H> {
    const fn public(&self) -> ConnectionState {
        match self {
            Self::Absent => ConnectionState::Absent,
            Self::Connected { .. } => ConnectionState::Connected,
            Self::Reconnecting => ConnectionState::Reconnecting,
        }
    }

    fn fresh(&self, interval: Duration) -> Option<Arc<H>> {
        match self {
            Self::Connected { handle, checked_at } if checked_at.elapsed() < interval => {
                Some(Arc::clone(handle))
            }
            _ => None,
        }
    }
}

/// Lazily connecting, self-healing owner of one handle kind
pub struct Supervisor<C: Connector> {
    connector: C,
    state: RwLock<HandleState<C::Handle>>,
    health_check_interval: Duration,
    timeout: Option<Duration>,
    generation: AtomicU64,
}

impl<C: Connector> Supervisor<C> {
    pub fn new(connector: C, health_check_interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            connector,
            state: RwLock::new(HandleState::Absent),
            health_check_interval,
            timeout,
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn kind(&self) -> HandleKind {
        self.connector.kind()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub async fn state(&self) -> ConnectionState {
        self.state.read().await.public()
    }

    /// Number of handles built so far
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Return a live handle, connecting or reconnecting as needed.
    ///
    /// # Errors
    ///
    /// The connect error if a new handle had to be built and could not be;
    /// the next call tries again.
    pub async fn acquire(&self) -> Result<Arc<C::Handle>> {
        if let Some(handle) = self.state.read().await.fresh(self.health_check_interval) {
            return Ok(handle);
        }

        let mut state = self.state.write().await;

        // Another task may have checked or connected while we waited.
        if let Some(handle) = state.fresh(self.health_check_interval) {
            return Ok(handle);
        }

        if let HandleState::Connected { handle, .. } = &*state {
            let handle = Arc::clone(handle);
            match self.bounded(handle.ping()).await {
                Ok(()) => {
                    tracing::debug!(kind = %self.kind(), "Health check succeeded");
                    *state = HandleState::Connected {
                        handle: Arc::clone(&handle),
                        checked_at: Instant::now(),
                    };
                    return Ok(handle);
                }
                Err(e) => {
                    tracing::warn!(
                        kind = %self.kind(),
                        error = %e,
                        "Redis connection lost, attempting to reconnect"
                    );
                    *state = HandleState::Reconnecting;
                }
            }
        }

        self.connect_locked(&mut state).await
    }

    /// Drop the current handle and build a new one.
    ///
    /// # Errors
    ///
    /// The connect error; the supervisor is left in `Reconnecting`.
    pub async fn reconnect(&self) -> Result<Arc<C::Handle>> {
        let mut state = self.state.write().await;
        *state = HandleState::Reconnecting;
        self.connect_locked(&mut state).await
    }

    async fn connect_locked(&self, state: &mut HandleState<C::Handle>) -> Result<Arc<C::Handle>> {
        match self.bounded(self.connector.connect()).await {
            Ok(handle) => {
                let handle = Arc::new(handle);
                let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
                tracing::info!(kind = %self.kind(), generation, "Redis connection established");
                *state = HandleState::Connected {
                    handle: Arc::clone(&handle),
                    checked_at: Instant::now(),
                };
                Ok(handle)
            }
            Err(e) => {
                tracing::error!(kind = %self.kind(), error = %e, "Redis connection failed");
                Err(e)
            }
        }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        with_timeout(self.timeout, fut).await
    }
}

/// Run `fut`, failing with [`CacheError::Timeout`] if it outlives `limit`
pub(crate) async fn with_timeout<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| CacheError::Timeout {
                timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            })?,
        None => fut.await,
    }
}
