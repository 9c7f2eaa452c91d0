//! Session store with per-key expiry

use super::lock;
use async_trait::async_trait;
use brain_application::{SessionStore, StoreError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct SessionValue {
    value: Value,
    expires_at: Instant,
}

impl SessionValue {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Keyed JSON values that expire after their TTL.
///
/// Expired values are dropped lazily on access, or in bulk by
/// [`InMemorySessionStore::purge_expired`].
#[derive(Default)]
pub struct InMemorySessionStore {
    values: Mutex<HashMap<String, SessionValue>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired value, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut values = lock(&self.values);
        let before = values.len();
        values.retain(|_, v| v.is_live(now));
        before - values.len()
    }

    /// Live values currently held.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        lock(&self.values).values().filter(|v| v.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::Rejected("session key cannot be empty".into()));
        }
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| StoreError::Rejected(format!("ttl out of range: {:?}", ttl)))?;
        lock(&self.values).insert(key.to_string(), SessionValue { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let now = Instant::now();
        let mut values = lock(&self.values);
        match values.get(key) {
            Some(v) if v.is_live(now) => Ok(Some(v.value.clone())),
            Some(_) => {
                values.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        Ok(lock(&self.values)
            .remove(key)
            .is_some_and(|v| v.is_live(now)))
    }
}
