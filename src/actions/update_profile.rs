use chrono::Utc;

use crate::events::{dispatch, AuditEvent};
use crate::identity::IdentityDirectory;
use crate::repository::{ProfileFields, User, UserRepository};
use crate::validators::validate_display_name;
use crate::AuthError;

/// Edits the caller's own profile. Email, role and credentials are not
/// editable here.
pub struct UpdateProfileAction<U: UserRepository> {
    directory: IdentityDirectory<U>,
}

impl<U: UserRepository> UpdateProfileAction<U> {
    pub fn new(user_repository: U) -> Self {
        Self {
            directory: IdentityDirectory::new(user_repository),
        }
    }

    /// Fields left as `None` keep their stored value.
    ///
    /// # Returns
    ///
    /// - `Ok(User)` - the updated user
    /// - `Err(AuthError::Validation(_))` - a blank or overlong name
    /// - `Err(AuthError::UserNotFound)` - unknown user
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "update_profile", skip_all, err))]
    pub async fn execute(&self, user_id: i64, mut profile: ProfileFields) -> Result<User, AuthError> {
        if let Some(name) = profile.name.as_deref() {
            validate_display_name(name)?;
        }
        profile.name = profile.name.map(|n| n.trim().to_owned());

        let user = self.directory.update_profile(user_id, profile).await?;

        log::info!(target: "teamward", "msg=\"profile updated\", user_id={}", user.id);

        dispatch(AuditEvent::ProfileUpdated {
            user_id: user.id,
            at: Utc::now(),
        })
        .await;

        Ok(user)
    }
}
