//! `courseforge-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: role
//! vocabulary, password hashing, token claims and the signing/verification
//! seam live here, nothing else.

pub mod claims;
pub mod password;
pub mod roles;
pub mod tokens;

pub use claims::{Claims, TOKEN_TTL_SECS, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use roles::Role;
pub use tokens::{Hs256Tokens, TokenError, TokenService};
