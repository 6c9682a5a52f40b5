use crate::{
    db::AffinityStore,
    error::{AppError, AppResult},
    models::{Shelf, ShelfPlacement},
};

/// System shelves a book must leave when it lands on `target`
///
/// A book sits on at most one system shelf per user. Custom shelves are
/// unaffected in both directions.
pub fn system_shelves_to_evict(target: &Shelf, owned: &[Shelf]) -> Vec<i64> {
    if !target.is_system {
        return Vec::new();
    }

    let mut ids: Vec<i64> = owned
        .iter()
        .filter(|s| s.is_system && s.user_id == target.user_id && s.id != target.id)
        .map(|s| s.id)
        .collect();
    ids.sort_unstable();
    ids
}

/// Adds a book to one of the caller's shelves
///
/// Shelves owned by someone else are reported as missing.
pub async fn add_book_to_shelf(
    store: &dyn AffinityStore,
    user_id: i64,
    shelf_id: i64,
    book_id: i64,
) -> AppResult<ShelfPlacement> {
    let shelf = store
        .get_shelf(shelf_id)
        .await?
        .filter(|shelf| shelf.user_id == user_id)
        .ok_or_else(|| AppError::NotFound("Shelf not found".to_string()))?;

    if store.get_book(book_id).await?.is_none() {
        return Err(AppError::NotFound("Book not found".to_string()));
    }

    let placement = store.place_book_on_shelf(&shelf, book_id).await?;
    tracing::info!(
        user_id = user_id,
        shelf_id = shelf.id,
        book_id = book_id,
        evicted = placement.evicted_from.len(),
        "Book placed on shelf"
    );
    Ok(placement)
}
