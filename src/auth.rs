//! Credentials and session tokens.
//!
//! Passwords are hashed with bcrypt on the blocking thread pool. Sessions are
//! stateless HS256 JWTs carrying the user id, role, and company; the HTTP layer
//! reads them from a bearer header or the `session` cookie.

use crate::{
    entities::{Role, user},
    errors::{Error, Result},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

const BCRYPT_COST: u32 = 10;

/// Environment variable holding the token signing secret
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string per the JWT convention
    pub sub: String,
    /// Login email
    pub email: String,
    /// Vendor or admin
    pub role: Role,
    /// Company the user belonged to when the token was issued
    pub company_id: Option<i64>,
    /// Expiry, seconds since the Unix epoch
    pub exp: u64,
}

impl Claims {
    /// Parses the numeric user id out of `sub`.
    pub fn user_id(&self) -> Result<i64> {
        self.sub.parse().map_err(|_| Error::Unauthorized)
    }
}

/// Signing and verification keys plus token lifetime.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: u64,
}

impl std::fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthKeys")
            .field("ttl_hours", &self.ttl_hours)
            .finish_non_exhaustive()
    }
}

impl AuthKeys {
    /// Builds keys from a shared secret.
    #[must_use]
    pub fn new(secret: &[u8], ttl_hours: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_hours,
        }
    }

    /// Builds keys from `JWT_SECRET`, which must be set and non-empty.
    pub fn from_env(ttl_hours: u64) -> Result<Self> {
        let secret = std::env::var(JWT_SECRET_VAR)?;
        if secret.trim().is_empty() {
            return Err(Error::Config {
                message: format!("{JWT_SECRET_VAR} must not be empty"),
            });
        }
        Ok(Self::new(secret.as_bytes(), ttl_hours))
    }

    /// Issues a session token for a user.
    pub fn issue(&self, user: &user::Model) -> Result<String> {
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            company_id: user.company_id,
            exp: now + self.ttl_hours * 3600,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(Into::into)
    }

    /// Validates a token's signature and expiry and returns its claims.
    ///
    /// Any failure is reported as [`Error::Unauthorized`].
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("Rejected session token: {e}");
                Error::Unauthorized
            })
    }
}

/// Hashes a password on the blocking pool.
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await?
        .map_err(Into::into)
}

/// Checks a password against a stored bcrypt hash.
pub async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await?
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn sample_user(role: Role) -> user::Model {
        let now = chrono::Utc::now();
        user::Model {
            id: 42,
            email: "vendor@example.com".to_string(),
            name: None,
            password_hash: String::new(),
            role,
            company_id: Some(7),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_and_verify_token() {
        let keys = AuthKeys::new(b"test-secret", 1);
        let token = keys.issue(&sample_user(Role::Admin)).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.company_id, Some(7));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let keys = AuthKeys::new(b"test-secret", 1);
        let other = AuthKeys::new(b"other-secret", 1);
        let token = other.issue(&sample_user(Role::Vendor)).unwrap();

        assert!(matches!(keys.verify(&token), Err(Error::Unauthorized)));
        assert!(matches!(keys.verify("garbage"), Err(Error::Unauthorized)));
    }

    #[tokio::test]
    async fn test_password_round_trip() -> Result<()> {
        let hash = hash_password("hunter22".to_string()).await?;
        assert!(verify_password("hunter22".to_string(), hash.clone()).await?);
        assert!(!verify_password("wrong".to_string(), hash).await?);
        Ok(())
    }
}
