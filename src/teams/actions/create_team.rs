use chrono::Utc;
use serde::Serialize;

use crate::events::{dispatch, AuditEvent};
use crate::teams::{Team, TeamMembership, TeamRepository};
use crate::validators::validate_team_name;
use crate::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTeamOutput {
    pub team: Team,
    /// The creator's OWNER membership, written with the team.
    pub membership: TeamMembership,
}

pub struct CreateTeamAction<T: TeamRepository> {
    team_repository: T,
}

impl<T: TeamRepository> CreateTeamAction<T> {
    pub fn new(team_repository: T) -> Self {
        Self { team_repository }
    }

    /// Creates a team owned by `owner_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(output)` - team and OWNER membership, both committed
    /// - `Err(AuthError::Validation(_))` - empty or overlong name
    /// - `Err(AuthError::UserNotFound)` - owner does not exist
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_team", skip_all, err)
    )]
    pub async fn execute(&self, name: &str, owner_id: i64) -> Result<CreateTeamOutput, AuthError> {
        validate_team_name(name)?;

        let (team, membership) = self
            .team_repository
            .create_team(name.trim(), owner_id)
            .await?;

        log::info!(
            target: "teamward",
            "msg=\"team created\", team_id={}, owner_id={}",
            team.id,
            owner_id
        );

        dispatch(AuditEvent::TeamCreated {
            team_id: team.id,
            owner_id,
            at: Utc::now(),
        })
        .await;

        Ok(CreateTeamOutput { team, membership })
    }
}
