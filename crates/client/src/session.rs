//! Explicit authentication context.

use serde::Deserialize;

use courseforge_auth::Role;
use courseforge_core::UserId;

/// The logged-in identity, as the login response reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

/// Authentication state for one [`crate::ApiClient`].
///
/// The client is the only writer: login stores token and user, logout and a
/// server-side 401 clear them. Everything else gets read-only access.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Option<(String, SessionUser)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.state.as_ref().map(|(token, _)| token.as_str())
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.state.as_ref().map(|(_, user)| user)
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }

    pub(crate) fn set(&mut self, token: String, user: SessionUser) {
        self.state = Some((token, user));
    }

    pub(crate) fn clear(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> SessionUser {
        SessionUser {
            id: UserId::new(),
            name: "Ana".to_string(),
            role: Role::Student,
        }
    }

    #[test]
    fn starts_logged_out() {
        let session = Session::new();
        assert!(!session.is_logged_in());
        assert_eq!(session.token(), None);
        assert_eq!(session.user(), None);
        assert_eq!(session.role(), None);
    }

    #[test]
    fn set_then_clear_round_trips() {
        let mut session = Session::new();
        session.set("tok".to_string(), ana());

        assert!(session.is_logged_in());
        assert_eq!(session.token(), Some("tok"));
        assert_eq!(session.role(), Some(Role::Student));
        assert_eq!(session.user().map(|u| u.name.as_str()), Some("Ana"));

        session.clear();
        assert!(!session.is_logged_in());
        assert_eq!(session.token(), None);
    }
}
