use axum::{
    Json, Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use hostel_types::api::MessageResponse;

use crate::auth::{self, AppState};
use crate::complaints;
use crate::middleware::require_auth;
use crate::users;

/// Full HTTP surface. CORS admits only `cors_origin`.
pub fn router(state: AppState, cors_origin: HeaderValue) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/users/register", post(auth::register))
        .route("/api/users/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/users/me", get(users::me))
        .route("/api/users/all", get(users::list_all))
        .route(
            "/api/complaints",
            post(complaints::create_complaint).get(complaints::list_complaints),
        )
        .route(
            "/api/complaints/",
            post(complaints::create_complaint).get(complaints::list_complaints),
        )
        .route(
            "/api/complaints/{complaint_id}",
            get(complaints::get_complaint)
                .put(complaints::update_complaint)
                .delete(complaints::delete_complaint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([cors_origin]))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to Hostel Complaint Portal API".to_string(),
    })
}

async fn health() -> &'static str {
    "OK"
}
