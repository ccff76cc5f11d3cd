//! HTTP surface. Request/response bodies live here; the router is in [`axum`].

mod types;

pub use types::*;

pub mod axum;
