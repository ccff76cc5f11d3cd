use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use password_hash::{PasswordHash, PasswordHasher as ArgonPasswordHasher, SaltString};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::AuthError;

/// Length of generated token ids.
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// One-way hashing of account passwords.
///
/// `verify` must not fail on a mismatch. It only errors when the stored digest
/// cannot be parsed, which callers treat as a corrupt credential.
///
/// ```rust
/// use teamward::crypto::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::fast();
/// let digest = hasher.hash("correct horse").unwrap();
/// assert!(hasher.verify("correct horse", &digest).unwrap());
/// assert!(!hasher.verify("battery staple", &digest).unwrap());
/// ```
pub trait PasswordHasher: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashError` if hashing fails.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::CorruptCredential` if `digest` is not a valid PHC string.
    fn verify(&self, password: &str, digest: &str) -> Result<bool, AuthError>;

    /// A well-formed digest that matches no password, costed like the ones
    /// `hash` produces. Verifying against it lets a caller spend the same work
    /// on an account that has no digest at all.
    fn decoy_digest(&self) -> String {
        Argon2Hasher::default().decoy_digest()
    }
}

/// Argon2id hasher with fixed cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Hasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Hasher {
    #[must_use]
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// 64 MiB, 3 iterations, 4 lanes.
    #[must_use]
    pub fn production() -> Self {
        Self::new(65536, 3, 4)
    }

    /// Minimal cost parameters. Only meant for tests and local tooling.
    #[must_use]
    pub fn fast() -> Self {
        Self::new(1024, 1, 1)
    }

    /// Resolves the `ARGON2_PROFILE` names used by [`crate::AuthConfig::from_env`].
    pub fn from_profile(profile: &str) -> Result<Self, AuthError> {
        match profile.trim().to_ascii_lowercase().as_str() {
            "" | "default" => Ok(Self::default()),
            "production" => Ok(Self::production()),
            "fast" => Ok(Self::fast()),
            other => Err(AuthError::ConfigurationError(format!(
                "unknown argon2 profile `{other}`"
            ))),
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| AuthError::PasswordHashError)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(digest).map_err(|_| AuthError::CorruptCredential)?;

        // cost parameters come from the digest itself
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn decoy_digest(&self) -> String {
        // zero salt and output, so no password can match
        format!(
            "$argon2id$v=19$m={},t={},p={}${}${}",
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            "A".repeat(22),
            "A".repeat(43)
        )
    }
}

/// Random alphanumeric string, used for token ids.
pub fn generate_token(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

/// SHA-256 hex digest of a token.
///
/// Revocation entries are keyed by this digest so the store never holds a
/// usable refresh token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::fast();
        let digest = hasher.hash("s3cret-pass").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("s3cret-pass", &digest).unwrap());
        assert!(!hasher.verify("wrong-pass", &digest).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = Argon2Hasher::fast();
        let a = hasher.hash("same-password").unwrap();
        let b = hasher.hash("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_decoy_digest_parses_and_never_matches() {
        let hasher = Argon2Hasher::fast();
        let decoy = hasher.decoy_digest();

        assert!(decoy.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert_eq!(hasher.verify("", &decoy), Ok(false));
        assert_eq!(hasher.verify("s3cret-pass", &decoy), Ok(false));
    }

    #[test]
    fn test_verify_rejects_malformed_digest() {
        let hasher = Argon2Hasher::fast();
        assert_eq!(
            hasher.verify("anything", "not-a-phc-string"),
            Err(AuthError::CorruptCredential)
        );
    }

    #[test]
    fn test_verify_uses_digest_parameters() {
        let digest = Argon2Hasher::fast().hash("portable").unwrap();
        assert!(Argon2Hasher::default().verify("portable", &digest).unwrap());
    }

    #[test]
    fn test_profiles() {
        assert_eq!(Argon2Hasher::from_profile("").unwrap(), Argon2Hasher::default());
        assert_eq!(
            Argon2Hasher::from_profile("Production").unwrap(),
            Argon2Hasher::production()
        );
        assert!(matches!(
            Argon2Hasher::from_profile("turbo"),
            Err(AuthError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_generate_token() {
        let token = generate_token(DEFAULT_TOKEN_LENGTH);
        assert_eq!(token.len(), DEFAULT_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_token(DEFAULT_TOKEN_LENGTH));
    }

    #[test]
    fn test_hash_token() {
        let digest = hash_token("refresh-token");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_token("refresh-token"));
        assert_ne!(digest, hash_token("refresh-token-2"));
    }
}
