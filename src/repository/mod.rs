//! Persistence collaborator for user accounts.
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`UserRepository`] | User lookups, atomic user + personal team provisioning, partial updates |
//! | [`TeamRepository`](crate::teams::TeamRepository) | Atomic team + owner creation, team lookups |
//! | [`TeamMembershipRepository`](crate::teams::TeamMembershipRepository) | Membership rows |
//!
//! Enable the `mocks` feature for [`MockDatabase`], an in-memory implementation
//! of all three with the same unique constraints as the SQL schema.

mod user;

#[cfg(any(test, feature = "mocks"))]
mod mock;

pub use user::{
    Gender, NewUser, ProfileFields, ProvisionedUser, User, UserRepository, UserUpdate,
};

#[cfg(any(test, feature = "mocks"))]
pub use mock::MockDatabase;
