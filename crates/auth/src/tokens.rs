//! Token issuing and verification (HS256).

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use courseforge_core::UserId;

use crate::{Claims, Role, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<TokenValidationError> for TokenError {
    fn from(err: TokenValidationError) -> Self {
        match err {
            TokenValidationError::Expired => TokenError::Expired,
            other => TokenError::Invalid(other.to_string()),
        }
    }
}

/// Signing/verification seam the API layer depends on.
pub trait TokenService: Send + Sync {
    /// Issue a signed token for the given user, valid for [`crate::TOKEN_TTL_SECS`].
    fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError>;

    /// Verify signature and time window, returning the embedded claims.
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 implementation over a shared secret.
pub struct Hs256Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256Tokens {
    pub fn new(secret: &str) -> Self {
        // Signature checking stays in jsonwebtoken; the time window runs
        // through `validate_claims` so expiry semantics live in one place.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenService for Hs256Tokens {
    fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, role, Utc::now());
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, Utc::now())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> Hs256Tokens {
        Hs256Tokens::new("unit-test-secret")
    }

    #[test]
    fn issued_tokens_verify_and_carry_subject_and_role() {
        let svc = service();
        let user = UserId::new();
        let token = svc.issue(user, Role::Instructor).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.role, Role::Instructor);
        assert_eq!(claims.exp - claims.iat, crate::TOKEN_TTL_SECS);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = Hs256Tokens::new("other-secret")
            .issue(UserId::new(), Role::Student)
            .unwrap();
        let err = service().verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let err = service().verify("not.a.token").unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: UserId::new(),
            role: Role::Student,
            iat: now - 2 * crate::TOKEN_TTL_SECS,
            exp: now - crate::TOKEN_TTL_SECS,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("unit-test-secret".as_bytes()),
        )
        .unwrap();
        let err = svc.verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }
}
