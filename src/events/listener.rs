use async_trait::async_trait;

use super::AuditEvent;

/// Receives every dispatched [`AuditEvent`].
///
/// Listeners run inline with the action that emitted the event, so keep them
/// fast or hand work off to a queue.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &AuditEvent);
}
