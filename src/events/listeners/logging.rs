use async_trait::async_trait;

use crate::events::{AuditEvent, Listener};

/// Writes each audit event as one `log` record under `teamward::audit`.
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &AuditEvent) {
        log::log!(
            target: "teamward::audit",
            self.level,
            "action={}, actor={:?}, {:?}",
            event.action(),
            event.actor_id(),
            event
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_levels() {
        assert_eq!(LoggingListener::default().level, log::Level::Info);
        assert_eq!(LoggingListener::with_level(log::Level::Debug).level, log::Level::Debug);
    }

    #[tokio::test]
    async fn test_handle_does_not_panic() {
        let event = AuditEvent::LoggedIn {
            user_id: 1,
            email: "test@example.com".to_owned(),
            at: Utc::now(),
        };
        LoggingListener::new().handle(&event).await;
    }
}
