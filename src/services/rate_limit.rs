//! Fixed-window attempt counting for the login gate.
//!
//! The counter lives behind [`CounterStore`] so that a shared cache can be
//! swapped in; [`InMemoryCounterStore`] keeps the counters in a `DashMap`
//! and increments them under the shard lock.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::services::clock::Clock;

#[derive(Debug, thiserror::Error)]
#[error("Counter store error: {0}")]
pub struct CounterStoreError(pub String);

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments `key` and returns the new count. A key that has
    /// no live window starts a fresh one lasting `ttl`.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterStoreError>;
}

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    count: u64,
    expires_at: DateTime<Utc>,
}

pub struct InMemoryCounterStore {
    counters: DashMap<String, WindowCounter>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCounterStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: DashMap::new(),
            clock,
        }
    }

    /// Drops windows that have ended.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.counters.retain(|key, counter| {
            let live = counter.expires_at > now;
            if !live {
                debug!(key = %key, "Removing expired rate limit window");
            }
            live
        });
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterStoreError> {
        let now = self.clock.now();
        let mut counter = self
            .counters
            .entry(key.to_string())
            .or_insert(WindowCounter {
                count: 0,
                expires_at: now + ttl,
            });
        if counter.expires_at <= now {
            *counter = WindowCounter {
                count: 0,
                expires_at: now + ttl,
            };
        }
        counter.count += 1;
        Ok(counter.count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Open { remaining: u64 },
    Locked,
}

pub struct LoginRateLimiter {
    store: Arc<dyn CounterStore>,
    max_attempts: u64,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, max_attempts: u64, window: Duration) -> Self {
        Self {
            store,
            max_attempts,
            window,
        }
    }

    /// Counts one login attempt from `client` and reports whether it may
    /// proceed. A failing store lets the attempt through.
    pub async fn register_attempt(&self, client: &str) -> GateState {
        let key = format!("ratelimit:login:{client}");
        match self.store.increment(&key, self.window).await {
            Ok(count) if count > self.max_attempts => {
                warn!(client = %client, attempts = count, "Login attempts exceeded the limit");
                GateState::Locked
            }
            Ok(count) => GateState::Open {
                remaining: self.max_attempts - count,
            },
            Err(e) => {
                error!(client = %client, error = %e, "Rate limit store failed; allowing attempt");
                GateState::Open { remaining: 0 }
            }
        }
    }
}
