use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::RevocationStore;
use crate::AuthError;

// ten years
const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Process-local revocation store.
///
/// Entries expire lazily on lookup. Call [`cleanup_expired`] periodically to
/// reclaim memory in long-running processes.
///
/// [`cleanup_expired`]: InMemoryRevocationStore::cleanup_expired
#[derive(Debug, Clone, Default)]
pub struct InMemoryRevocationStore {
    entries: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops expired entries and returns how many were removed.
    pub fn cleanup_expired(&self) -> Result<usize, AuthError> {
        let now = Utc::now();
        let mut entries = self.entries.write().map_err(poisoned)?;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok(before - entries.len())
    }

    /// Number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> AuthError {
    AuthError::StoreUnavailable("revocation map lock poisoned".to_owned())
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, token_id: &str, ttl_secs: u64) -> Result<(), AuthError> {
        let ttl = i64::try_from(ttl_secs.max(1))
            .unwrap_or(MAX_TTL_SECS)
            .min(MAX_TTL_SECS);
        let expires_at = Utc::now() + Duration::seconds(ttl);

        let mut entries = self.entries.write().map_err(poisoned)?;
        // a later revoke never shortens an existing entry
        entries
            .entry(token_id.to_owned())
            .and_modify(|existing| *existing = (*existing).max(expires_at))
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool, AuthError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(token_id)
            .is_some_and(|expires_at| *expires_at > Utc::now()))
    }

    async fn unrevoke(&self, token_id: &str) -> Result<(), AuthError> {
        self.entries.write().map_err(poisoned)?.remove(token_id);
        Ok(())
    }
}
