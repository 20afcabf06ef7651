//! Authorization guard: resolves the caller behind a bearer token and gates
//! protected operations by role and ownership.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

use hostel_types::models::User;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};

/// Extract and validate the bearer token, then load the live user record into
/// the request extensions for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve_caller(&state, req.headers()).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Returns the caller's current user record. Token validity alone is not
/// enough: the account must still exist, and its stored role wins over the
/// role in the token.
pub async fn resolve_caller(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthenticated)?;

    let identity = state.tokens.validate(bearer.token())?;

    let state = state.clone();
    let row = blocking(move || Ok(state.db.get_user_by_id(identity.user_id)?)).await?;

    match row {
        Some(row) => Ok(User::try_from(row)?),
        None => {
            debug!("Token references missing user {}", identity.user_id);
            Err(ApiError::Unauthenticated)
        }
    }
}

pub fn require_admin(user: &User) -> Result<(), ApiError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Access denied".into()))
    }
}

/// `action` names the attempted operation in the denial message
/// ("access", "update", "delete").
pub fn require_owner_or_admin(user: &User, owner_id: i64, action: &str) -> Result<(), ApiError> {
    if user.role.is_admin() || user.id == owner_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Not authorized to {action} this complaint"
        )))
    }
}
