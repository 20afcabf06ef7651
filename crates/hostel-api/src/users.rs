use axum::{Extension, Json, extract::State, response::IntoResponse};

use hostel_types::models::User;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::middleware::require_admin;

/// GET /api/users/me
pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

/// GET /api/users/all (admins only)
pub async fn list_all(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&caller)?;

    let users = blocking(move || {
        state
            .db
            .list_users()?
            .into_iter()
            .map(|row| User::try_from(row).map_err(ApiError::from))
            .collect::<Result<Vec<_>, _>>()
    })
    .await?;

    Ok(Json(users))
}
