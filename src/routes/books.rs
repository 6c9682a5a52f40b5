use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{error::AppResult, models::SimilarBook, services::recommendations};

use super::{bounded, AppState};

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    limit: Option<String>,
}

pub async fn similar(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    Query(params): Query<SimilarQuery>,
) -> AppResult<Json<Vec<SimilarBook>>> {
    let limit = bounded("limit", params.limit.as_deref(), 6, 1, 20)?;
    let books = recommendations::similar_books(state.store.as_ref(), book_id, limit).await?;
    Ok(Json(books))
}
