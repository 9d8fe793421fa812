//! In-memory fakes for exercising the supervisor and manager without a server.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{CacheError, Result};
use crate::transport::{CacheHandle, Connector, HandleKind};

#[derive(Default)]
struct Inner {
    strings: HashMap<String, (String, Option<Duration>)>,
    hashes: HashMap<String, HashMap<String, String>>,
    pings: usize,
    hset_budget: Option<usize>,
}

/// Shared backing data, survives handle replacement
#[derive(Clone, Default)]
pub struct FakeStore {
    inner: Arc<Mutex<Inner>>,
}

impl FakeStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn pings(&self) -> usize {
        self.lock().pings
    }

    /// Let `n` more HSETs succeed, then fail every one after
    pub fn fail_hset_after(&self, n: usize) {
        self.lock().hset_budget = Some(n);
    }

    #[must_use]
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.lock()
            .strings
            .get(key)
            .and_then(|(_, ttl)| *ttl)
    }
}

pub struct FakeHandle {
    store: FakeStore,
    alive: AtomicBool,
}

impl FakeHandle {
    /// Make every later call on this handle fail as a dropped connection would
    pub fn sever(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.alive.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Transport("connection reset by peer".to_string()))
        }
    }
}

#[async_trait]
impl CacheHandle for FakeHandle {
    async fn ping(&self) -> Result<()> {
        self.store.lock().pings += 1;
        self.check()
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.check()?;
        self.store
            .lock()
            .strings
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self
            .store
            .lock()
            .strings
            .get(key)
            .map(|(value, _)| value.clone()))
    }

    async fn hset(&self, name: &str, field: &str, value: &str) -> Result<()> {
        self.check()?;
        let mut inner = self.store.lock();
        if let Some(budget) = inner.hset_budget.as_mut() {
            if *budget == 0 {
                return Err(CacheError::Transport("broken pipe".to_string()));
            }
            *budget -= 1;
        }
        inner
            .hashes
            .entry(name.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hgetall(&self, name: &str) -> Result<HashMap<String, String>> {
        self.check()?;
        Ok(self
            .store
            .lock()
            .hashes
            .get(name)
            .cloned()
            .unwrap_or_default())
    }
}

pub struct FakeConnector {
    kind: HandleKind,
    store: FakeStore,
    connects: AtomicUsize,
    fail: AtomicBool,
}

impl FakeConnector {
    #[must_use]
    pub fn new(kind: HandleKind, store: FakeStore) -> Self {
        Self {
            kind,
            store,
            connects: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    /// Connect attempts so far, failed ones included
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn fail_connects(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Handle = FakeHandle;

    fn kind(&self) -> HandleKind {
        self.kind
    }

    async fn connect(&self) -> Result<FakeHandle> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CacheError::Transport("connection refused".to_string()));
        }
        Ok(FakeHandle {
            store: self.store.clone(),
            alive: AtomicBool::new(true),
        })
    }
}
