use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::repository::{Gender, ProfileFields};
use crate::validators::{validate_email, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    GitHub,
    Google,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::Google => "google",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "github" => Some(Self::GitHub),
            "google" => Some(Self::Google),
            _ => None,
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider profile normalized at the boundary.
///
/// Construct it through [`OAuthProfile::new`] or one of the provider adapters so
/// the email and provider id are known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    provider: OAuthProvider,
    provider_id: String,
    email: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    phone_number: Option<String>,
    gender: Option<Gender>,
    date_of_birth: Option<NaiveDate>,
}

impl OAuthProfile {
    pub fn new(
        provider: OAuthProvider,
        provider_id: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let provider_id = provider_id.into();
        let email = email.into();

        if provider_id.trim().is_empty() {
            return Err(ValidationError::OAuthIdMissing);
        }
        if email.is_empty() {
            return Err(ValidationError::OAuthEmailMissing);
        }
        validate_email(&email)?;

        Ok(Self {
            provider,
            provider_id,
            email,
            display_name: None,
            avatar_url: None,
            phone_number: None,
            gender: None,
            date_of_birth: None,
        })
    }

    #[must_use]
    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = non_blank(name);
        self
    }

    #[must_use]
    pub fn with_avatar_url(mut self, url: Option<String>) -> Self {
        self.avatar_url = non_blank(url);
        self
    }

    #[must_use]
    pub fn with_phone_number(mut self, phone: Option<String>) -> Self {
        self.phone_number = non_blank(phone);
        self
    }

    #[must_use]
    pub fn with_gender(mut self, gender: Option<Gender>) -> Self {
        self.gender = gender;
        self
    }

    #[must_use]
    pub fn with_date_of_birth(mut self, date: Option<NaiveDate>) -> Self {
        self.date_of_birth = date;
        self
    }

    pub fn provider(&self) -> OAuthProvider {
        self.provider
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub(crate) fn profile_fields(&self) -> ProfileFields {
        ProfileFields {
            name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            phone_number: self.phone_number.clone(),
            gender: self.gender,
            date_of_birth: self.date_of_birth,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileValue {
    pub value: String,
}

/// Profile payload as delivered by the GitHub strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubProfile {
    /// GitHub sends numeric ids; both forms are accepted.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub emails: Vec<ProfileValue>,
    #[serde(default)]
    pub photos: Vec<ProfileValue>,
}

impl TryFrom<GitHubProfile> for OAuthProfile {
    type Error = ValidationError;

    fn try_from(raw: GitHubProfile) -> Result<Self, Self::Error> {
        let email = raw
            .emails
            .into_iter()
            .map(|e| e.value)
            .find(|v| !v.trim().is_empty())
            .ok_or(ValidationError::OAuthEmailMissing)?;

        let name = non_blank(raw.display_name).or(raw.username);
        let avatar = raw.photos.into_iter().next().map(|p| p.value);

        Ok(OAuthProfile::new(OAuthProvider::GitHub, raw.id, email)?
            .with_display_name(name)
            .with_avatar_url(avatar))
    }
}

/// Profile payload posted by the Google sign-in client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub oauth_id: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

impl TryFrom<GoogleProfile> for OAuthProfile {
    type Error = ValidationError;

    fn try_from(raw: GoogleProfile) -> Result<Self, Self::Error> {
        Ok(OAuthProfile::new(OAuthProvider::Google, raw.oauth_id, raw.email)?
            .with_display_name(raw.name)
            .with_avatar_url(raw.avatar_url)
            .with_phone_number(raw.phone_number)
            .with_gender(raw.gender)
            .with_date_of_birth(raw.date_of_birth))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_adapter() {
        let raw: GitHubProfile = serde_json::from_value(serde_json::json!({
            "id": 583231,
            "username": "octocat",
            "displayName": "The Octocat",
            "emails": [{ "value": "octocat@github.com" }],
            "photos": [{ "value": "https://avatars.githubusercontent.com/u/583231" }]
        }))
        .unwrap();

        let profile = OAuthProfile::try_from(raw).unwrap();
        assert_eq!(profile.provider(), OAuthProvider::GitHub);
        assert_eq!(profile.provider_id(), "583231");
        assert_eq!(profile.email(), "octocat@github.com");
        assert_eq!(profile.display_name(), Some("The Octocat"));
        assert_eq!(
            profile.avatar_url(),
            Some("https://avatars.githubusercontent.com/u/583231")
        );
    }

    #[test]
    fn test_github_falls_back_to_username() {
        let raw: GitHubProfile = serde_json::from_value(serde_json::json!({
            "id": "42",
            "username": "octocat",
            "displayName": "",
            "emails": [{ "value": "octocat@github.com" }]
        }))
        .unwrap();

        let profile = OAuthProfile::try_from(raw).unwrap();
        assert_eq!(profile.display_name(), Some("octocat"));
        assert_eq!(profile.avatar_url(), None);
    }

    #[test]
    fn test_github_without_email_is_rejected() {
        let raw: GitHubProfile =
            serde_json::from_value(serde_json::json!({ "id": 1, "emails": [] })).unwrap();
        assert_eq!(
            OAuthProfile::try_from(raw).unwrap_err(),
            ValidationError::OAuthEmailMissing
        );
    }

    #[test]
    fn test_google_adapter() {
        let raw: GoogleProfile = serde_json::from_value(serde_json::json!({
            "email": "ada@example.com",
            "name": "Ada",
            "oauthId": "g-123",
            "gender": "PREFER_NOT_TO_SAY",
            "dateOfBirth": "1990-12-10"
        }))
        .unwrap();

        let profile = OAuthProfile::try_from(raw).unwrap();
        let fields = profile.profile_fields();
        assert_eq!(profile.provider(), OAuthProvider::Google);
        assert_eq!(fields.gender, Some(Gender::PreferNotToSay));
        assert_eq!(fields.date_of_birth, NaiveDate::from_ymd_opt(1990, 12, 10));
    }

    #[test]
    fn test_missing_fields_are_validation_errors() {
        assert_eq!(
            OAuthProfile::new(OAuthProvider::Google, "", "a@example.com").unwrap_err(),
            ValidationError::OAuthIdMissing
        );
        assert_eq!(
            OAuthProfile::new(OAuthProvider::Google, "id", "").unwrap_err(),
            ValidationError::OAuthEmailMissing
        );
        assert_eq!(
            OAuthProfile::new(OAuthProvider::Google, "id", "nope").unwrap_err(),
            ValidationError::EmailInvalidFormat
        );
    }
}
