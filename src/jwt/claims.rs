use serde::{Deserialize, Serialize};

use crate::authorization::SystemRole;
use crate::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Payload signed into every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    /// System role at the time of issue.
    pub role: SystemRole,
    /// Primary team, when the session is scoped to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenType::Access
    }

    pub fn is_refresh_token(&self) -> bool {
        self.token_type == TokenType::Refresh
    }
}
