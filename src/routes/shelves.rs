use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult, middleware::CurrentUser, models::ShelfPlacement, services::shelves,
};

use super::AppState;

/// Handler for adding a book to one of the caller's shelves
pub async fn add_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((shelf_id, book_id)): Path<(i64, i64)>,
) -> AppResult<Json<ShelfPlacement>> {
    let placement =
        shelves::add_book_to_shelf(state.store.as_ref(), user.id, shelf_id, book_id).await?;
    Ok(Json(placement))
}
