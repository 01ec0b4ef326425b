use courseforge_auth::Role;
use courseforge_core::UserId;

/// Authenticated caller of a request.
///
/// Inserted by the auth middleware after token verification; handlers and the
/// role-gate middleware read it from request extensions. Immutable and present
/// on every protected route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    user_id: UserId,
    role: Role,
}

impl CurrentUser {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
