//! Expiring set of revoked refresh tokens.
//!
//! Keys are opaque token identifiers. The auth flows pass
//! [`hash_token`](crate::crypto::hash_token) of the raw refresh token.

mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::InMemoryRevocationStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisRevocationStore;

use async_trait::async_trait;

use crate::AuthError;

/// Backing store for refresh-token revocation.
///
/// `revoke` must be visible to the next `is_revoked` call for the same key.
/// Implementations report outages as `AuthError::StoreUnavailable`; whether
/// that blocks a refresh is decided by
/// [`RevocationFailurePolicy`](crate::config::RevocationFailurePolicy).
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks `token_id` revoked for `ttl_secs` seconds.
    async fn revoke(&self, token_id: &str, ttl_secs: u64) -> Result<(), AuthError>;

    async fn is_revoked(&self, token_id: &str) -> Result<bool, AuthError>;

    /// Administrative undo of [`RevocationStore::revoke`].
    async fn unrevoke(&self, token_id: &str) -> Result<(), AuthError>;
}
