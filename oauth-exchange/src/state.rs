//! Pending login attempts keyed by their correlation key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use log::*;
use rand::Rng;

use crate::error::{state_error, Error, StateErrorKind};
use crate::flow::FlowAttempt;

const STATE_PREFIX: &str = "lcldy";

/// Store of attempts that have redirected the user and await the callback.
///
/// Each attempt is handed out at most once: `take_and_remove` looks up and
/// removes under the same lock. Without a TTL entries live until consumed.
#[derive(Clone, Default)]
pub struct PendingStateStore {
    attempts: Arc<Mutex<HashMap<String, FlowAttempt>>>,
    ttl: Option<Duration>,
}

impl PendingStateStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose attempts expire `ttl` after creation.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            attempts: Arc::new(Mutex::new(HashMap::new())),
            ttl: Some(ttl),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, FlowAttempt>> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // A deadline past the end of chrono's range never expires.
    fn is_expired(&self, attempt: &FlowAttempt) -> bool {
        self.ttl
            .and_then(|ttl| attempt.created_at.checked_add_signed(ttl))
            .map(|deadline| Utc::now() > deadline)
            .unwrap_or(false)
    }

    /// Register an attempt. Fails if its key is already pending and not expired.
    pub fn put(&self, attempt: FlowAttempt) -> Result<(), Error> {
        let mut attempts = self.lock();
        if attempts
            .get(&attempt.key)
            .is_some_and(|existing| self.is_expired(existing))
        {
            debug!("Replacing expired pending attempt {}", attempt.key);
            attempts.remove(&attempt.key);
        }
        if attempts.contains_key(&attempt.key) {
            return Err(state_error(
                StateErrorKind::DuplicateKey,
                &format!("Correlation key {} is already pending", attempt.key),
            ));
        }

        debug!(
            "Pending {} attempt {} registered",
            attempt.provider.name, attempt.key
        );
        attempts.insert(attempt.key.clone(), attempt);
        Ok(())
    }

    /// Remove and return the attempt for `key`, if pending and not expired.
    pub fn take_and_remove(&self, key: &str) -> Option<FlowAttempt> {
        let attempt = self.lock().remove(key)?;
        if self.is_expired(&attempt) {
            debug!("Pending attempt {key} expired");
            return None;
        }
        Some(attempt)
    }

    pub fn has(&self, key: &str) -> bool {
        self.lock()
            .get(key)
            .map(|attempt| !self.is_expired(attempt))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop expired attempts. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let mut attempts = self.lock();
        let before = attempts.len();
        attempts.retain(|_, attempt| !self.is_expired(attempt));
        let purged = before - attempts.len();
        if purged > 0 {
            info!("Purged {purged} expired pending OAuth attempts");
        }
        purged
    }
}

/// Fresh OAuth 2.0 `state` value: `lcldy` followed by 20 random bytes, URL-safe base64.
pub fn generate_state_key() -> String {
    let random_bytes: [u8; 20] = rand::thread_rng().gen();
    format!("{STATE_PREFIX}{}", URL_SAFE_NO_PAD.encode(random_bytes))
}
