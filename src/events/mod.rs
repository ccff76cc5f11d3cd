//! Audit events emitted by every action.
//!
//! Nothing happens unless listeners are registered once at startup:
//!
//! ```rust,no_run
//! use teamward::events::listeners::LoggingListener;
//! use teamward::register_event_listeners;
//!
//! register_event_listeners(|registry| {
//!     registry.listen(LoggingListener::new());
//! });
//! ```
//!
//! Persisting an audit trail is left to a custom [`Listener`].

mod audit;
mod listener;
mod registry;

pub mod listeners;

pub use audit::AuditEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners, EventRegistry};
