use std::cmp::Ordering;

use crate::{
    db::AffinityStore,
    error::{AppError, AppResult},
    models::{
        LovedBook, RatingAggregates, SharedRating, SharedSort, TasteComparison, User, UserSummary,
    },
};

use super::{
    paginate,
    visibility::{resolve_access, Area},
};

/// Largest possible rating difference on the 1-5 scale
pub const MAX_RATING_DIFF: f64 = 4.0;
/// Shared ratings needed before a correlation is reported
pub const MIN_PEARSON_SAMPLE: i64 = 5;
/// Size of the agreement and disagreement highlight lists
pub const HIGHLIGHT_LIMIT: usize = 5;
/// Size of each loved-but-unread list
pub const LOVED_UNREAD_LIMIT: i64 = 10;

/// Maps a mean absolute difference to a 0-100 score rounded to one decimal
pub fn compute_similarity_score(mean_abs_diff: f64, common_count: i64) -> f64 {
    if common_count <= 0 {
        return 0.0;
    }
    let score = (1.0 - mean_abs_diff / MAX_RATING_DIFF).max(0.0) * 100.0;
    (score * 10.0).round() / 10.0
}

/// Pearson correlation from pre-aggregated sums
///
/// `None` when fewer than five pairs are available or either side has zero
/// variance.
pub fn compute_pearson_from_aggregates(
    count: i64,
    sum_x: f64,
    sum_y: f64,
    sum_x2: f64,
    sum_y2: f64,
    sum_xy: f64,
) -> Option<f64> {
    if count < MIN_PEARSON_SAMPLE {
        return None;
    }

    let n = count as f64;
    let mean_x = sum_x / n;
    let mean_y = sum_y / n;
    let numerator = sum_xy - n * mean_x * mean_y;
    let denom_x = sum_x2 - n * mean_x * mean_x;
    let denom_y = sum_y2 - n * mean_y * mean_y;
    let denom = (denom_x * denom_y).sqrt();
    if denom == 0.0 || denom.is_nan() {
        return None;
    }
    Some(numerator / denom)
}

/// Pearson correlation for an aggregate bundle
pub fn pearson(aggregates: &RatingAggregates) -> Option<f64> {
    compute_pearson_from_aggregates(
        aggregates.count,
        aggregates.sum_x,
        aggregates.sum_y,
        aggregates.sum_x2,
        aggregates.sum_y2,
        aggregates.sum_xy,
    )
}

fn by_title(a: &SharedRating, b: &SharedRating) -> Ordering {
    a.title.cmp(&b.title).then(a.book_id.cmp(&b.book_id))
}

/// Closest ratings first, then higher average rating, then title
pub fn agreements(shared: &[SharedRating]) -> Vec<SharedRating> {
    let mut rows = shared.to_vec();
    rows.sort_by(|a, b| {
        a.diff
            .cmp(&b.diff)
            .then(b.rating_sum().cmp(&a.rating_sum()))
            .then_with(|| by_title(a, b))
    });
    rows.truncate(HIGHLIGHT_LIMIT);
    rows
}

/// Widest gaps first, then higher of the two ratings, then title
pub fn disagreements(shared: &[SharedRating]) -> Vec<SharedRating> {
    let mut rows = shared.to_vec();
    rows.sort_by(|a, b| {
        b.diff
            .cmp(&a.diff)
            .then(b.max_rating().cmp(&a.max_rating()))
            .then_with(|| by_title(a, b))
    });
    rows.truncate(HIGHLIGHT_LIMIT);
    rows
}

/// Sorts the shared set by the caller's key; title breaks every tie
pub fn sort_shared(shared: &mut [SharedRating], sort: SharedSort) {
    shared.sort_by(|a, b| {
        let primary = match sort {
            SharedSort::DiffDesc => b.diff.cmp(&a.diff),
            SharedSort::DiffAsc => a.diff.cmp(&b.diff),
            SharedSort::Title => Ordering::Equal,
            SharedSort::ViewerRating => b.viewer_rating.cmp(&a.viewer_rating),
            SharedSort::TargetRating => b.target_rating.cmp(&a.target_rating),
        };
        primary.then_with(|| by_title(a, b))
    });
}

/// Orders loved-unread rows by rating desc then title, capped
pub fn order_loved(mut books: Vec<LovedBook>) -> Vec<LovedBook> {
    books.sort_by(|a, b| {
        b.rating
            .cmp(&a.rating)
            .then(a.title.cmp(&b.title))
            .then(a.book_id.cmp(&b.book_id))
    });
    books.truncate(LOVED_UNREAD_LIMIT as usize);
    books
}

/// Compares the viewer's ratings with the target's
///
/// The caller must already have passed the visibility gate for the target.
pub async fn compare(
    store: &dyn AffinityStore,
    viewer: &User,
    target: &User,
    sort: SharedSort,
    limit: usize,
    offset: usize,
) -> AppResult<TasteComparison> {
    let aggregates = store.shared_rating_aggregates(viewer.id, target.id).await?;
    let mut shared = store.shared_ratings(viewer.id, target.id).await?;

    let common_count = aggregates.count;
    let mean_abs_diff = aggregates.mean_abs_diff();
    let similarity_score = compute_similarity_score(mean_abs_diff, common_count);
    let pearson = pearson(&aggregates);

    let agreements = agreements(&shared);
    let disagreements = disagreements(&shared);

    sort_shared(&mut shared, sort);
    let shared_ratings = paginate(shared, offset, limit);

    let viewer_loved = order_loved(
        store
            .loved_unread(viewer.id, target.id, LOVED_UNREAD_LIMIT)
            .await?,
    );
    let target_loved = order_loved(
        store
            .loved_unread(target.id, viewer.id, LOVED_UNREAD_LIMIT)
            .await?,
    );

    tracing::info!(
        viewer_id = viewer.id,
        target_id = target.id,
        common_count = common_count,
        similarity_score = similarity_score,
        has_pearson = pearson.is_some(),
        sort = %sort,
        "Taste comparison computed"
    );

    Ok(TasteComparison {
        viewer: UserSummary::from(viewer),
        target: UserSummary::from(target),
        common_count,
        similarity_score,
        mean_abs_diff,
        pearson,
        agreements,
        disagreements,
        viewer_loved_target_unread: viewer_loved.into_iter().map(Into::into).collect(),
        target_loved_viewer_unread: target_loved.into_iter().map(Into::into).collect(),
        shared_ratings,
    })
}

/// Resolves both users, applies the visibility gate and compares them
///
/// The sort key is parsed only after the gate, so a missing or hidden
/// target reports 404 or 403 before a bad key reports 400.
pub async fn taste_compare(
    store: &dyn AffinityStore,
    viewer_id: i64,
    target_id: i64,
    sort: Option<&str>,
    limit: usize,
    offset: usize,
) -> AppResult<TasteComparison> {
    let (target, access) = resolve_access(store, viewer_id, target_id).await?;
    access.require(Area::TasteCompare)?;

    let sort = match sort {
        None => SharedSort::default(),
        Some(raw) => raw.parse::<SharedSort>().map_err(AppError::InvalidInput)?,
    };

    let viewer = if access.is_owner() {
        target.clone()
    } else {
        store
            .get_user(viewer_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?
    };

    compare(store, &viewer, &target, sort, limit, offset).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockAffinityStore;
    use tokio_test::assert_ok;

    fn user(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            is_private: false,
            avatar_url: None,
        }
    }

    fn loved(book_id: i64, title: &str, rating: i32) -> LovedBook {
        LovedBook {
            book_id,
            title: title.to_string(),
            cover_url: None,
            authors: vec![],
            rating,
        }
    }

    fn greek_shared() -> Vec<SharedRating> {
        vec![
            SharedRating::new(1, "Alpha", 5, 4),
            SharedRating::new(2, "Beta", 1, 5),
            SharedRating::new(3, "Gamma", 4, 4),
        ]
    }

    fn titles(rows: &[SharedRating]) -> Vec<&str> {
        rows.iter().map(|r| r.title.as_str()).collect()
    }

    fn greek_store() -> MockAffinityStore {
        let mut store = MockAffinityStore::new();
        store
            .expect_shared_rating_aggregates()
            .returning(|_, _| Ok(RatingAggregates::from_pairs(&greek_shared())));
        store
            .expect_shared_ratings()
            .returning(|_, _| Ok(greek_shared()));
        store.expect_loved_unread().returning(|lover, _, _| {
            if lover == 1 {
                Ok(vec![loved(4, "Delta", 5)])
            } else {
                Ok(vec![loved(5, "Epsilon", 5)])
            }
        });
        store
    }

    #[test]
    fn test_similarity_edge_cases() {
        assert_eq!(compute_similarity_score(0.0, 0), 0.0);
        assert_eq!(compute_similarity_score(0.0, 1), 100.0);
        assert_eq!(compute_similarity_score(4.0, 1), 0.0);
        assert_eq!(compute_similarity_score(5.0 / 3.0, 3), 58.3);
    }

    #[test]
    fn test_pearson_insufficient_data() {
        assert_eq!(
            compute_pearson_from_aggregates(1, 5.0, 5.0, 25.0, 25.0, 25.0),
            None
        );
        assert_eq!(
            compute_pearson_from_aggregates(4, 10.0, 10.0, 30.0, 30.0, 30.0),
            None
        );
    }

    #[test]
    fn test_pearson_zero_variance_is_none() {
        // viewer rated every book 3
        let rows: Vec<SharedRating> = (1..=5)
            .map(|i| SharedRating::new(i, format!("B{}", i), 3, (i % 5 + 1) as i32))
            .collect();
        assert_eq!(pearson(&RatingAggregates::from_pairs(&rows)), None);
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let rows: Vec<SharedRating> = (1..=5)
            .map(|i| SharedRating::new(i, format!("B{}", i), i as i32, i as i32))
            .collect();
        let r = pearson(&RatingAggregates::from_pairs(&rows)).unwrap();
        assert!((r - 1.0).abs() < 1e-9);

        let inverse: Vec<SharedRating> = (1..=5)
            .map(|i| SharedRating::new(i, format!("B{}", i), i as i32, 6 - i as i32))
            .collect();
        let r = pearson(&RatingAggregates::from_pairs(&inverse)).unwrap();
        assert!((r + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_agreement_tiebreaks() {
        let rows = vec![
            SharedRating::new(1, "Zeta", 3, 3),
            SharedRating::new(2, "Eta", 5, 5),
            SharedRating::new(3, "Alpha", 3, 3),
            SharedRating::new(4, "Theta", 1, 5),
        ];
        assert_eq!(titles(&agreements(&rows)), vec!["Eta", "Alpha", "Zeta", "Theta"]);
    }

    #[test]
    fn test_disagreement_tiebreaks() {
        let rows = vec![
            SharedRating::new(1, "Low", 1, 3),
            SharedRating::new(2, "High", 5, 3),
            SharedRating::new(3, "Apex", 3, 5),
            SharedRating::new(4, "Same", 4, 4),
        ];
        assert_eq!(titles(&disagreements(&rows)), vec!["Apex", "High", "Low", "Same"]);
    }

    #[test]
    fn test_highlights_are_capped() {
        let rows: Vec<SharedRating> = (1..=8)
            .map(|i| SharedRating::new(i, format!("Book {}", i), 3, 4))
            .collect();
        assert_eq!(agreements(&rows).len(), HIGHLIGHT_LIMIT);
        assert_eq!(disagreements(&rows).len(), HIGHLIGHT_LIMIT);
    }

    #[test]
    fn test_sort_shared_keys() {
        let mut rows = greek_shared();
        sort_shared(&mut rows, SharedSort::DiffDesc);
        assert_eq!(titles(&rows), vec!["Beta", "Alpha", "Gamma"]);
        sort_shared(&mut rows, SharedSort::DiffAsc);
        assert_eq!(titles(&rows), vec!["Gamma", "Alpha", "Beta"]);
        sort_shared(&mut rows, SharedSort::Title);
        assert_eq!(titles(&rows), vec!["Alpha", "Beta", "Gamma"]);
        sort_shared(&mut rows, SharedSort::ViewerRating);
        assert_eq!(titles(&rows), vec!["Alpha", "Gamma", "Beta"]);
        sort_shared(&mut rows, SharedSort::TargetRating);
        assert_eq!(titles(&rows), vec!["Beta", "Alpha", "Gamma"]);
    }

    #[test]
    fn test_order_loved_caps_and_sorts() {
        let books: Vec<LovedBook> = (1..=12)
            .map(|i| loved(i, &format!("Book {:02}", i), if i % 2 == 0 { 5 } else { 4 }))
            .collect();
        let ordered = order_loved(books);
        assert_eq!(ordered.len(), 10);
        assert_eq!(ordered[0].title, "Book 02");
        assert!(ordered[..6].iter().all(|b| b.rating == 5));
    }

    #[tokio::test]
    async fn test_compare_shared_ratings_payload() {
        let store = greek_store();
        let result = assert_ok!(
            compare(&store, &user(1), &user(2), SharedSort::DiffDesc, 50, 0).await
        );

        assert_eq!(result.common_count, 3);
        assert!((result.mean_abs_diff - 1.6667).abs() < 1e-3);
        assert_eq!(result.similarity_score, 58.3);
        assert_eq!(result.pearson, None);
        assert_eq!(result.agreements[0].title, "Gamma");
        assert_eq!(result.disagreements[0].title, "Beta");
        assert_eq!(result.shared_ratings.len(), 3);
        assert_eq!(result.viewer_loved_target_unread[0].title, "Delta");
        assert_eq!(result.target_loved_viewer_unread[0].title, "Epsilon");
        assert!(result
            .viewer_loved_target_unread
            .iter()
            .all(|row| row.title != "Epsilon"));
    }

    #[tokio::test]
    async fn test_compare_paginates_shared_ratings() {
        let store = greek_store();
        let result = assert_ok!(
            compare(&store, &user(1), &user(2), SharedSort::Title, 1, 1).await
        );
        assert_eq!(titles(&result.shared_ratings), vec!["Beta"]);
        assert_eq!(result.agreements.len(), 3);
    }

    #[tokio::test]
    async fn test_compare_without_overlap() {
        let mut store = MockAffinityStore::new();
        store
            .expect_shared_rating_aggregates()
            .returning(|_, _| Ok(RatingAggregates::default()));
        store.expect_shared_ratings().returning(|_, _| Ok(vec![]));
        store.expect_loved_unread().returning(|_, _, _| Ok(vec![]));

        let result = assert_ok!(
            compare(&store, &user(1), &user(2), SharedSort::DiffDesc, 50, 0).await
        );
        assert_eq!(result.common_count, 0);
        assert_eq!(result.similarity_score, 0.0);
        assert_eq!(result.mean_abs_diff, 0.0);
        assert!(result.agreements.is_empty());
    }

    #[tokio::test]
    async fn test_private_target_without_follow_is_forbidden() {
        let mut store = MockAffinityStore::new();
        store.expect_get_user().returning(|id| {
            Ok(Some(User {
                is_private: id == 2,
                ..user(id)
            }))
        });
        store
            .expect_follow_status()
            .returning(|_, _| Ok(crate::models::FollowStatus::Pending));
        store.expect_shared_ratings().never();

        let result = taste_compare(&store, 1, 2, None, 50, 0).await;
        assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg == "Not allowed to compare taste"));
    }

    #[tokio::test]
    async fn test_gate_runs_before_sort_parsing() {
        let mut store = MockAffinityStore::new();
        store.expect_get_user().returning(|id| {
            Ok(Some(User {
                is_private: id == 2,
                ..user(id)
            }))
        });
        store
            .expect_follow_status()
            .returning(|_, _| Ok(crate::models::FollowStatus::None));
        store.expect_shared_ratings().never();

        let hidden = taste_compare(&store, 1, 2, Some("bogus"), 50, 0).await;
        assert!(matches!(hidden, Err(AppError::Forbidden(_))));

        let mut missing = MockAffinityStore::new();
        missing.expect_get_user().returning(|_| Ok(None));
        let result = taste_compare(&missing, 1, 999, Some("bogus"), 50, 0).await;
        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "User not found"));
    }

    #[tokio::test]
    async fn test_bad_sort_rejected_once_visible() {
        let mut store = MockAffinityStore::new();
        store.expect_get_user().returning(|id| Ok(Some(user(id))));
        store
            .expect_follow_status()
            .returning(|_, _| Ok(crate::models::FollowStatus::None));
        store.expect_shared_ratings().never();

        let result = taste_compare(&store, 1, 2, Some("bogus"), 50, 0).await;
        assert!(matches!(result, Err(AppError::InvalidInput(msg)) if msg == "Invalid sort option"));
    }

    #[tokio::test]
    async fn test_accepted_follower_can_compare() {
        let mut store = greek_store();
        store.expect_get_user().returning(|id| {
            Ok(Some(User {
                is_private: true,
                ..user(id)
            }))
        });
        store
            .expect_follow_status()
            .returning(|_, _| Ok(crate::models::FollowStatus::Accepted));

        let result = assert_ok!(taste_compare(&store, 1, 2, Some("diff_desc"), 50, 0).await);
        assert_eq!(result.viewer.id, 1);
        assert_eq!(result.target.id, 2);
    }

    #[tokio::test]
    async fn test_compare_is_deterministic() {
        let store = greek_store();
        let first = compare(&store, &user(1), &user(2), SharedSort::DiffAsc, 50, 0)
            .await
            .unwrap();
        let second = compare(&store, &user(1), &user(2), SharedSort::DiffAsc, 50, 0)
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
