//! Typed client for the courseforge API.
//!
//! Owns the authentication [`Session`] explicitly: login stores it, logout
//! and server-side 401s clear it, and nothing else touches it. The
//! [`navigation`] tables describe which screens each role gets, so a
//! presentation layer reads capabilities from one place instead of
//! hard-coding role checks.

pub mod api;
pub mod error;
pub mod navigation;
pub mod session;
pub mod types;

pub use api::ApiClient;
pub use error::ClientError;
pub use navigation::{NavEntry, landing_route, navigation};
pub use session::{Session, SessionUser};
