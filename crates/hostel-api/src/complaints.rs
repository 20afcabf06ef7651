use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use hostel_types::api::{CreateComplaintRequest, UpdateComplaintRequest};
use hostel_types::models::User;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::lifecycle;

pub async fn create_complaint(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(req): Json<CreateComplaintRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let complaint = blocking(move || lifecycle::create(&state.db, caller.id, &req)).await?;
    Ok(Json(complaint))
}

pub async fn list_complaints(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let complaints = blocking(move || lifecycle::list_visible(&state.db, &caller)).await?;
    Ok(Json(complaints))
}

pub async fn get_complaint(
    State(state): State<AppState>,
    Path(complaint_id): Path<i64>,
    Extension(caller): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let complaint =
        blocking(move || lifecycle::get_for(&state.db, complaint_id, &caller)).await?;
    Ok(Json(complaint))
}

pub async fn update_complaint(
    State(state): State<AppState>,
    Path(complaint_id): Path<i64>,
    Extension(caller): Extension<User>,
    Json(patch): Json<UpdateComplaintRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let complaint =
        blocking(move || lifecycle::update(&state.db, complaint_id, &patch, &caller)).await?;
    Ok(Json(complaint))
}

pub async fn delete_complaint(
    State(state): State<AppState>,
    Path(complaint_id): Path<i64>,
    Extension(caller): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(move || lifecycle::delete(&state.db, complaint_id, &caller)).await?;
    Ok(StatusCode::NO_CONTENT)
}
