//! Read-through response cache for public aggregate surfaces
//!
//! Keyed by a normalized request fingerprint, holding JSON response bodies
//! for a short TTL (~5 minutes by default). Callers of cached surfaces may
//! see data up to one TTL period stale; that staleness is part of the
//! contract, not an accident. If the underlying query fails, a fixed
//! fallback payload is served instead and the failure is logged as degraded;
//! fallbacks are never cached, so a recovered store is picked up on the next
//! request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::warn;

use crate::domain::EngineError;

struct CacheSlot {
    stored_at: Instant,
    value: Value,
}

/// TTL cache over JSON payloads, shared across request handlers
#[derive(Clone)]
pub struct ResponseCache {
    slots: Arc<Mutex<HashMap<String, CacheSlot>>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Serve `key` from cache if fresh, else compute and cache the result.
    /// On compute failure the `fallback` payload is returned uncached.
    pub fn get_or_compute<F>(&self, key: &str, compute: F, fallback: Value) -> Value
    where
        F: FnOnce() -> Result<Value, EngineError>,
    {
        {
            let slots = self.slots.lock().expect("cache lock poisoned");
            if let Some(slot) = slots.get(key) {
                if slot.stored_at.elapsed() < self.ttl {
                    return slot.value.clone();
                }
            }
        }

        match compute() {
            Ok(value) => {
                let mut slots = self.slots.lock().expect("cache lock poisoned");
                slots.insert(
                    key.to_string(),
                    CacheSlot {
                        stored_at: Instant::now(),
                        value: value.clone(),
                    },
                );
                value
            }
            Err(e) => {
                warn!(key, error = %e, "serving degraded fallback payload");
                fallback
            }
        }
    }

    /// Drop every cached entry (used after imports that change aggregates)
    pub fn clear(&self) {
        self.slots.lock().expect("cache lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_caches_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let mut calls = 0;
        for _ in 0..3 {
            let v = cache.get_or_compute(
                "k",
                || {
                    calls += 1;
                    Ok(json!({"n": 1}))
                },
                json!(null),
            );
            assert_eq!(v, json!({"n": 1}));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_expired_entry_recomputes() {
        let cache = ResponseCache::new(Duration::from_millis(0));
        let mut calls = 0;
        for _ in 0..2 {
            cache.get_or_compute(
                "k",
                || {
                    calls += 1;
                    Ok(json!(calls))
                },
                json!(null),
            );
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_fallback_on_failure_is_not_cached() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let v = cache.get_or_compute(
            "k",
            || Err(EngineError::Unavailable),
            json!({"degraded": true}),
        );
        assert_eq!(v, json!({"degraded": true}));

        // A later successful compute replaces the fallback immediately
        let v = cache.get_or_compute("k", || Ok(json!({"ok": true})), json!(null));
        assert_eq!(v, json!({"ok": true}));
    }

    #[test]
    fn test_clear() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.get_or_compute("k", || Ok(json!(1)), json!(null));
        cache.clear();
        let mut called = false;
        cache.get_or_compute(
            "k",
            || {
                called = true;
                Ok(json!(2))
            },
            json!(null),
        );
        assert!(called);
    }
}
