//! Signed access/refresh token pairs.
//!
//! Access tokens are short-lived and checked by signature and expiry only.
//! Refresh tokens are long-lived, signed with a separate key, and gated by a
//! [`RevocationStore`](crate::revocation::RevocationStore) in
//! [`RefreshTokenAction`](crate::actions::RefreshTokenAction).
//!
//! ```rust
//! use teamward::jwt::{JwtConfig, TokenService};
//!
//! let config = JwtConfig::new(
//!     "access-secret-that-is-at-least-32-bytes",
//!     "refresh-secret-that-is-at-least-32-bytes",
//! )?
//! .with_issuer("teamward");
//! let tokens = TokenService::new(config);
//! # Ok::<(), teamward::AuthError>(())
//! ```

mod claims;
mod config;
mod service;

pub use claims::{Claims, TokenType};
pub use config::{JwtConfig, MIN_SECRET_LENGTH};
pub use service::{TokenPair, TokenService};
