use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, middleware::Next, response::Response};

use courseforge_auth::{Role, TokenService};

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenService>,
}

/// Authentication stage: verify the bearer token and attach the caller's
/// identity to the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;

    let claims = state
        .tokens
        .verify(token)
        .map_err(|_e| invalid_token())?;

    req.extensions_mut()
        .insert(CurrentUser::new(claims.sub, claims.role));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(invalid_token)?;

    let header = header.to_str().map_err(|_| invalid_token())?;

    let header = header.strip_prefix("Bearer ").ok_or_else(invalid_token)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(invalid_token());
    }

    Ok(token)
}

fn invalid_token() -> ApiError {
    ApiError::auth("Missing or invalid token")
}

/// Role stage: the single role a router subtree is reserved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGate {
    role: Role,
}

impl RoleGate {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    fn denied_message(&self) -> &'static str {
        match self.role {
            Role::Student => "Student access required",
            Role::Instructor => "Instructor access required",
            Role::Admin => "Admin access required",
        }
    }
}

/// Role stage: reject callers whose role does not match the gate.
///
/// Runs after [`auth_middleware`]; a request that somehow reaches it without
/// a [`CurrentUser`] is answered 401, not 500.
pub async fn require_role(
    State(gate): State<RoleGate>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    match req.extensions().get::<CurrentUser>() {
        Some(user) if user.role() == gate.role => Ok(next.run(req).await),
        Some(_) => Err(ApiError::forbidden(gate.denied_message())),
        None => Err(invalid_token()),
    }
}
