use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

/// Remembers which signed payloads have already been redeemed.
///
/// `check_and_set` must be atomic: of any number of concurrent calls with
/// the same nonce, exactly one returns `true`.
pub trait ReplayGuard: Send + Sync {
    /// Marks `nonce` as used through `expires_at`, inclusive.
    ///
    /// Returns `true` if this call marked it, `false` if it was already marked
    /// and has not yet expired at `now`.
    fn check_and_set(
        &self,
        nonce: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool>;
}

#[derive(Debug, Default)]
pub struct InMemoryReplayGuard {
    used: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nonces currently held, expired or not.
    pub fn len(&self) -> usize {
        self.used.lock().map(|used| used.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReplayGuard for InMemoryReplayGuard {
    fn check_and_set(
        &self,
        nonce: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut used = self
            .used
            .lock()
            .map_err(|_| anyhow!("replay guard mutex was poisoned"))?;

        used.retain(|_, expiry| *expiry >= now);

        if used.contains_key(nonce) {
            return Ok(false);
        }
        used.insert(nonce.to_string(), expires_at);
        Ok(true)
    }
}
