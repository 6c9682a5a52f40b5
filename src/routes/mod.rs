use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    db::AffinityStore,
    error::{AppError, AppResult},
    middleware::{make_span_with_request_id, request_id_middleware, USER_ID_HEADER},
};

pub mod books;
pub mod follow_requests;
pub mod recommendations;
pub mod shelves;
pub mod users;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AffinityStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn AffinityStore>) -> Self {
        Self { store }
    }
}

/// Creates the application router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/me/recommendations/sections",
            get(recommendations::sections),
        )
        .route("/me/recommendations", get(recommendations::list))
        .route("/me/follow-requests", get(follow_requests::list))
        .route(
            "/me/follow-requests/:request_id/approve",
            post(follow_requests::approve),
        )
        .route(
            "/me/follow-requests/:request_id/deny",
            post(follow_requests::deny),
        )
        .route("/books/:book_id/similar", get(books::similar))
        .route("/users/:user_id", get(users::profile))
        .route("/users/:user_id/visibility", get(users::visibility))
        .route("/users/:user_id/shelves", get(users::shelves))
        .route("/users/:user_id/activity", get(users::activity))
        .route("/users/:user_id/liked-authors", get(users::liked_authors))
        .route("/users/:user_id/taste-compare", get(users::taste_compare))
        .route("/users/:user_id/follow", post(users::follow))
        .route("/users/:user_id/unfollow", post(users::unfollow))
        .route(
            "/shelves/:shelf_id/books/:book_id",
            post(shelves::add_book),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Parses an optional integer query parameter
///
/// Query params arrive as strings so that malformed numbers surface as
/// `InvalidInput` with the JSON error body.
fn parse_int(name: &str, value: Option<&str>) -> AppResult<Option<i64>> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| AppError::InvalidInput(format!("{} must be an integer", name)))
        })
        .transpose()
}

/// Resolves an optional query parameter against an inclusive range
pub(crate) fn bounded(
    name: &str,
    value: Option<&str>,
    default: i64,
    min: i64,
    max: i64,
) -> AppResult<usize> {
    let value = parse_int(name, value)?.unwrap_or(default);
    if value < min || value > max {
        return Err(AppError::InvalidInput(format!(
            "{} must be between {} and {}",
            name, min, max
        )));
    }
    Ok(value as usize)
}

pub(crate) fn offset(value: Option<&str>) -> AppResult<usize> {
    match parse_int("offset", value)?.unwrap_or(0) {
        v if v < 0 => Err(AppError::InvalidInput(
            "offset must be non-negative".to_string(),
        )),
        v => Ok(v as usize),
    }
}
