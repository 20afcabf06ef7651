//! Session token issuance and validation (HS256 JWTs).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use hostel_types::api::Claims;
use hostel_types::models::Role;

use crate::error::ApiError;

/// Default session lifetime, in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 120;

/// Longest accepted session lifetime, in minutes (one year).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// The identity a token binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

/// Signs and verifies session tokens with a process-wide secret that is
/// read-only after construction.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, ApiError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("token expiry out of range")))?;
        let claims = Claims {
            sub: identity.user_id.to_string(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("token signing failed: {}", e)))
    }

    /// Fails with `Unauthenticated` on a bad signature, a malformed token, an
    /// expired token, or a non-numeric subject.
    pub fn validate(&self, token: &str) -> Result<Identity, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            ApiError::Unauthenticated
        })?;

        let user_id = data
            .claims
            .sub
            .parse()
            .map_err(|_| ApiError::Unauthenticated)?;

        Ok(Identity {
            user_id,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl() -> Duration {
        Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES)
    }

    fn identity() -> Identity {
        Identity {
            user_id: 7,
            email: "a@x.com".into(),
            role: Role::Student,
        }
    }

    #[test]
    fn issued_token_validates() {
        let tokens = TokenService::new("unit-test-secret", ttl());
        let token = tokens.issue(&identity()).unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), identity());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = TokenService::new("secret-one", ttl());
        let verifier = TokenService::new("secret-two", ttl());
        let token = issuer.issue(&identity()).unwrap();
        assert!(matches!(
            verifier.validate(&token),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Well past the default 60s leeway.
        let tokens = TokenService::new("unit-test-secret", Duration::minutes(-10));
        let token = tokens.issue(&identity()).unwrap();
        assert!(matches!(
            tokens.validate(&token),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn unrepresentable_expiry_is_an_error_not_a_panic() {
        let tokens = TokenService::new("unit-test-secret", Duration::MAX);
        assert!(matches!(
            tokens.issue(&identity()),
            Err(ApiError::Internal(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = TokenService::new("unit-test-secret", ttl());
        assert!(matches!(
            tokens.validate("not.a.jwt"),
            Err(ApiError::Unauthenticated)
        ));
    }
}
