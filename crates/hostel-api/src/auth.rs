use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use hostel_db::Database;
use hostel_types::api::{LoginRequest, RegisterRequest};

use crate::accounts;
use crate::error::{ApiError, blocking};
use crate::token::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
}

/// POST /api/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(move || accounts::register(&state.db, req)).await?;
    Ok(Json(user))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let resp = blocking(move || accounts::login(&state.db, &state.tokens, &req)).await?;
    Ok(Json(resp))
}
