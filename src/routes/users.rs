use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{ActivityItem, FollowOutcome, LikedAuthor, Profile, ShelfOut, TasteComparison},
    services::{activity, social, taste_compare as taste, VisibilityReport},
};

use super::{bounded, offset, AppState};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    limit: Option<String>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TasteQuery {
    limit: Option<String>,
    offset: Option<String>,
    sort: Option<String>,
}

pub async fn profile(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Profile>> {
    let profile = social::profile(state.store.as_ref(), viewer.id, user_id).await?;
    Ok(Json(profile))
}

pub async fn visibility(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<VisibilityReport>> {
    let report = social::visibility(state.store.as_ref(), viewer.id, user_id).await?;
    Ok(Json(report))
}

pub async fn shelves(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<ShelfOut>>> {
    let shelves = social::visible_shelves(state.store.as_ref(), viewer.id, user_id).await?;
    Ok(Json(shelves))
}

pub async fn activity(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(user_id): Path<i64>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<Vec<ActivityItem>>> {
    let limit = bounded("limit", params.limit.as_deref(), 10, 1, 50)?;
    let offset = offset(params.offset.as_deref())?;

    let items =
        activity::activity_feed(state.store.as_ref(), viewer.id, user_id, limit, offset).await?;
    Ok(Json(items))
}

pub async fn liked_authors(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(user_id): Path<i64>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<LikedAuthor>>> {
    let limit = bounded("limit", params.limit.as_deref(), 10, 1, 50)?;
    let authors =
        social::liked_authors(state.store.as_ref(), viewer.id, user_id, limit as i64).await?;
    Ok(Json(authors))
}

/// Handler for comparing the caller's ratings with another user's
pub async fn taste_compare(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(user_id): Path<i64>,
    Query(params): Query<TasteQuery>,
) -> AppResult<Json<TasteComparison>> {
    let limit = bounded("limit", params.limit.as_deref(), 50, 1, 100)?;
    let offset = offset(params.offset.as_deref())?;

    let comparison = taste::taste_compare(
        state.store.as_ref(),
        viewer.id,
        user_id,
        params.sort.as_deref(),
        limit,
        offset,
    )
    .await?;
    Ok(Json(comparison))
}

pub async fn follow(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<FollowOutcome>> {
    let outcome = social::follow_user(state.store.as_ref(), viewer.id, user_id).await?;
    Ok(Json(outcome))
}

pub async fn unfollow(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    social::unfollow_user(state.store.as_ref(), viewer.id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
