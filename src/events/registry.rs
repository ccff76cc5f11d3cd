use std::sync::OnceLock;

use super::{AuditEvent, Listener};

static REGISTRY: OnceLock<EventRegistry> = OnceLock::new();

pub struct EventRegistry {
    listeners: Vec<Box<dyn Listener>>,
}

impl EventRegistry {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Listeners are called in registration order.
    pub fn listen(&mut self, listener: impl Listener) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    async fn dispatch(&self, event: &AuditEvent) {
        for listener in &self.listeners {
            listener.handle(event).await;
        }
    }
}

/// Installs the process-wide listeners. Only the first call takes effect.
pub fn register_event_listeners<F>(f: F)
where
    F: FnOnce(&mut EventRegistry),
{
    let mut registry = EventRegistry::new();
    f(&mut registry);
    if REGISTRY.set(registry).is_err() {
        log::warn!(
            target: "teamward",
            "msg=\"register_event_listeners called more than once, ignoring\""
        );
    }
}

/// No-op until listeners are registered.
pub async fn dispatch(event: AuditEvent) {
    if let Some(registry) = REGISTRY.get() {
        registry.dispatch(&event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    static SEEN: Mutex<Vec<AuditEvent>> = Mutex::new(Vec::new());

    struct Recorder;

    #[async_trait]
    impl Listener for Recorder {
        async fn handle(&self, event: &AuditEvent) {
            SEEN.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn test_registered_listener_receives_events() {
        register_event_listeners(|registry| {
            registry.listen(Recorder);
        });
        // later registrations are ignored
        register_event_listeners(|_| {});

        let event = AuditEvent::TeamCreated {
            team_id: 777_001,
            owner_id: 1,
            at: Utc::now(),
        };
        dispatch(event.clone()).await;

        assert!(SEEN.lock().unwrap().contains(&event));
    }
}
