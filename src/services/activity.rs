use std::collections::HashMap;

use crate::{
    db::AffinityStore,
    error::AppResult,
    models::{
        ActivityItem, ActivityKind, ReadingState, ReadingStatusEntry, ReviewEntry, User,
        UserSummary,
    },
};

use super::{
    paginate,
    visibility::{resolve_access, Area},
};

/// Merges status entries and reviews into one feed, newest first
///
/// Finished entries pick up the rating of the user's review of the same book.
pub fn merge_activity(
    user: &User,
    statuses: Vec<ReadingStatusEntry>,
    reviews: Vec<ReviewEntry>,
) -> Vec<ActivityItem> {
    let summary = UserSummary::from(user);
    let ratings: HashMap<i64, i32> = reviews.iter().map(|r| (r.book.id, r.rating)).collect();

    let mut items: Vec<ActivityItem> = Vec::with_capacity(statuses.len() + reviews.len());
    items.extend(statuses.into_iter().map(|entry| {
        let rating = match entry.status {
            ReadingState::Finished => ratings.get(&entry.book.id).copied(),
            _ => None,
        };
        ActivityItem {
            kind: ActivityKind::Status,
            user: summary.clone(),
            book: entry.book,
            status: Some(entry.status),
            rating,
            body: None,
            updated_at: entry.updated_at,
        }
    }));
    items.extend(reviews.into_iter().map(|review| ActivityItem {
        kind: ActivityKind::Review,
        user: summary.clone(),
        book: review.book,
        status: None,
        rating: Some(review.rating),
        body: review.body,
        updated_at: review.updated_at,
    }));

    items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    items
}

/// Activity feed of the target as seen by the viewer
pub async fn activity_feed(
    store: &dyn AffinityStore,
    viewer_id: i64,
    target_id: i64,
    limit: usize,
    offset: usize,
) -> AppResult<Vec<ActivityItem>> {
    let (target, access) = resolve_access(store, viewer_id, target_id).await?;
    access.require(Area::Activity)?;

    let statuses = store.reading_statuses(target.id).await?;
    let reviews = store.visible_reviews(target.id).await?;

    Ok(paginate(merge_activity(&target, statuses, reviews), offset, limit))
}
