use async_trait::async_trait;

use crate::events::{AuditEvent, Listener};

/// Emits audit events as `tracing` events.
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &AuditEvent) {
        tracing::info!(
            target: "teamward::audit",
            action = event.action(),
            actor = ?event.actor_id(),
            ?event,
            "audit event"
        );
    }
}
