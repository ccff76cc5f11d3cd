//! User lookup and provisioning for password and OAuth sign-in.

mod directory;
mod oauth;

pub use directory::{IdentityDirectory, OAuthOutcome};
pub use oauth::{GitHubProfile, GoogleProfile, OAuthProfile, OAuthProvider, ProfileValue};
