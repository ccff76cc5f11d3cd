use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;

use super::RevocationStore;
use crate::AuthError;

const KEY_PREFIX: &str = "blacklist:";

/// Revocation store backed by Redis `SET key revoked EX ttl`.
///
/// Uses a `ConnectionManager`, so a dropped connection is re-established on
/// the next command instead of poisoning the store.
#[derive(Clone)]
pub struct RedisRevocationStore {
    manager: ConnectionManager,
}

impl RedisRevocationStore {
    pub async fn connect(url: &str) -> Result<Self, AuthError> {
        let client = Client::open(url).map_err(|e| {
            AuthError::ConfigurationError(format!("invalid redis url: {e}"))
        })?;

        let manager = client.get_connection_manager().await.map_err(|e| {
            log::error!(target: "teamward", "msg=\"failed to connect to redis\", error=\"{e}\"");
            AuthError::StoreUnavailable(e.to_string())
        })?;

        log::info!(target: "teamward", "msg=\"connected to redis revocation store\"");
        Ok(Self { manager })
    }

    pub fn from_manager(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    fn key(token_id: &str) -> String {
        format!("{KEY_PREFIX}{token_id}")
    }
}

fn unavailable(e: redis::RedisError) -> AuthError {
    log::error!(target: "teamward", "msg=\"redis command failed\", error=\"{e}\"");
    AuthError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, token_id: &str, ttl_secs: u64) -> Result<(), AuthError> {
        let mut conn = self.manager.clone();

        redis::cmd("SET")
            .arg(Self::key(token_id))
            .arg("revoked")
            .arg("EX")
            .arg(ttl_secs.max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool, AuthError> {
        let mut conn = self.manager.clone();

        redis::cmd("EXISTS")
            .arg(Self::key(token_id))
            .query_async::<_, bool>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn unrevoke(&self, token_id: &str) -> Result<(), AuthError> {
        let mut conn = self.manager.clone();

        redis::cmd("DEL")
            .arg(Self::key(token_id))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(unavailable)
    }
}
