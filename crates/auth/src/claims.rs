use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use courseforge_core::UserId;

use crate::Role;

/// Token lifetime: 24 hours from issue.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// JWT claims model (transport-agnostic).
///
/// This is the full set of claims a courseforge token carries once decoded.
/// `iat`/`exp` are unix seconds, the wire shape every JWT library expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    /// Role granted to the subject.
    pub role: Role,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiration, unix seconds.
    pub exp: i64,
}

impl Claims {
    pub fn new(sub: UserId, role: Role, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub,
            role,
            iat,
            exp: iat + TOKEN_TTL_SECS,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate token claims against a caller-supplied clock.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// is the token service's job.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
