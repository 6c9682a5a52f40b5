use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{Book, RecommendationSection},
    services::recommendations,
};

use super::{bounded, offset, AppState};

#[derive(Debug, Deserialize)]
pub struct SectionsQuery {
    sections: Option<String>,
    per: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<String>,
    offset: Option<String>,
}

/// Handler for per-seed recommendation sections
pub async fn sections(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<SectionsQuery>,
) -> AppResult<Json<Vec<RecommendationSection>>> {
    let sections = bounded("sections", params.sections.as_deref(), 3, 1, 6)?;
    let per = bounded("per", params.per.as_deref(), 3, 1, 8)?;

    let result =
        recommendations::recommendation_sections(state.store.as_ref(), user.id, sections, per)
            .await?;
    Ok(Json(result))
}

/// Handler for the merged recommendation list
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let limit = bounded("limit", params.limit.as_deref(), 12, 1, 50)?;
    let offset = offset(params.offset.as_deref())?;

    let books =
        recommendations::recommendation_list(state.store.as_ref(), user.id, limit, offset).await?;
    Ok(Json(books))
}
