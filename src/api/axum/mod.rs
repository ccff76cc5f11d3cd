//! Axum router over the account and team actions.
//!
//! ```rust,ignore
//! use teamward::api::axum::{app_routes, AppState};
//! use teamward::{AuthConfig, InMemoryRevocationStore, MockDatabase};
//!
//! let db = MockDatabase::new();
//! let state = AppState::new(db.clone(), db.clone(), db, InMemoryRevocationStore::new(), AuthConfig::from_env()?);
//! let app = app_routes().with_state(state);
//! ```

mod error;
mod handlers;
mod middleware;
mod routes;
mod teams;

pub use error::AppError;
pub use middleware::{extract_bearer_token, AuthenticatedUser};
pub use routes::{app_routes, auth_routes, AppState};
pub use teams::team_routes;
