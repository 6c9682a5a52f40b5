use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{FollowOutcome, FollowRequest},
    services::social,
};

use super::AppState;

/// Handler for the caller's pending follow requests
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<FollowRequest>>> {
    let requests = social::list_follow_requests(state.store.as_ref(), user.id).await?;
    Ok(Json(requests))
}

pub async fn approve(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(request_id): Path<i64>,
) -> AppResult<Json<FollowOutcome>> {
    let outcome =
        social::approve_follow_request(state.store.as_ref(), user.id, request_id).await?;
    Ok(Json(outcome))
}

pub async fn deny(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(request_id): Path<i64>,
) -> AppResult<StatusCode> {
    social::deny_follow_request(state.store.as_ref(), user.id, request_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
