//! Storage rules that live in SQL, run against a scratch database.
//!
//! `#[sqlx::test]` creates a fresh database per test from `DATABASE_URL`
//! and applies the migrations before handing over the pool.

use sqlx::PgPool;

use affinity_api::{
    db::{AffinityStore, PgAffinityStore},
    models::{FollowStatus, ShelfVisibility},
};

const ALICE: i64 = 1;
const BOB: i64 = 2;

const SEED: &str = r#"
INSERT INTO users (id, username, is_private) VALUES
    (1, 'alice', FALSE),
    (2, 'bob', TRUE);

INSERT INTO books (id, title) VALUES
    (1, 'Alpha'), (2, 'Beta'), (3, 'Gamma'), (4, 'Delta'), (5, 'Epsilon'), (6, 'Zeta');

INSERT INTO reviews (user_id, book_id, rating, is_hidden) VALUES
    (1, 1, 5, FALSE), (1, 2, 2, FALSE), (1, 3, 4, FALSE), (1, 4, 5, FALSE),
    (1, 5, 5, FALSE), (1, 6, 4, FALSE),
    (2, 1, 4, FALSE), (2, 2, 2, FALSE), (2, 3, 1, FALSE), (2, 4, 1, TRUE);

INSERT INTO reading_statuses (user_id, book_id, status) VALUES (2, 6, 'reading');

INSERT INTO shelves (id, user_id, name, is_system, visibility) VALUES
    (10, 1, 'read', TRUE, 'public'),
    (11, 1, 'reading', TRUE, 'followers'),
    (12, 1, 'favourites', FALSE, 'private');

INSERT INTO shelf_books (shelf_id, book_id) VALUES (10, 1), (12, 1);
"#;

async fn seeded(pool: PgPool) -> PgAffinityStore {
    sqlx::raw_sql(SEED).execute(&pool).await.unwrap();
    PgAffinityStore::new(pool)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_hidden_review_left_out_of_shared_set(pool: PgPool) {
    let store = seeded(pool).await;

    let shared = store.shared_ratings(ALICE, BOB).await.unwrap();
    let ids: Vec<i64> = shared.iter().map(|r| r.book_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let agg = store.shared_rating_aggregates(ALICE, BOB).await.unwrap();
    assert_eq!(agg.count, 3);
    assert_eq!(agg.sum_abs_diff, 4.0);
    assert_eq!(agg.sum_x, 11.0);
    assert_eq!(agg.sum_y, 7.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rating_average_ignores_hidden_reviews(pool: PgPool) {
    let store = seeded(pool).await;

    let delta = store.get_book(4).await.unwrap().unwrap();
    assert_eq!(delta.rating_avg, Some(5.0));
    assert_eq!(delta.rating_count, 1);

    let alpha = store.get_book(1).await.unwrap().unwrap();
    assert_eq!(alpha.rating_avg, Some(4.5));

    let reviews = store.visible_reviews(BOB).await.unwrap();
    assert_eq!(reviews.len(), 3);
    assert!(reviews.iter().all(|r| r.book.id != 4));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_loved_unread_counts_hidden_reviews_and_statuses_as_read(pool: PgPool) {
    let store = seeded(pool).await;

    // Delta has BOB's hidden review, Zeta his reading status
    let loved = store.loved_unread(ALICE, BOB, 10).await.unwrap();
    let titles: Vec<&str> = loved.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Epsilon"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_system_shelf_placement_is_exclusive(pool: PgPool) {
    let store = seeded(pool).await;

    let reading = store.get_shelf(11).await.unwrap().unwrap();
    assert_eq!(reading.visibility, ShelfVisibility::Followers);

    let placement = store.place_book_on_shelf(&reading, 1).await.unwrap();
    assert_eq!(placement.evicted_from, vec![10]);

    let shelves = store.user_shelves(ALICE).await.unwrap();
    let books_on = |name: &str| -> Vec<i64> {
        shelves
            .iter()
            .find(|s| s.shelf.name == name)
            .map(|s| s.books.iter().map(|b| b.id).collect())
            .unwrap_or_default()
    };
    assert!(books_on("read").is_empty());
    assert_eq!(books_on("reading"), vec![1]);
    assert_eq!(books_on("favourites"), vec![1]);

    // custom shelves never evict
    let favourites = store.get_shelf(12).await.unwrap().unwrap();
    let placement = store.place_book_on_shelf(&favourites, 2).await.unwrap();
    assert!(placement.evicted_from.is_empty());

    let again = store.place_book_on_shelf(&reading, 1).await.unwrap();
    assert!(again.evicted_from.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_follow_request_lifecycle(pool: PgPool) {
    let store = seeded(pool).await;

    let status = store
        .create_follow(ALICE, BOB, FollowStatus::Pending)
        .await
        .unwrap();
    assert_eq!(status, FollowStatus::Pending);

    let requests = store.pending_follow_requests(BOB).await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].requester.username, "alice");

    let follow = store.get_follow(requests[0].id).await.unwrap().unwrap();
    assert_eq!((follow.requester_id, follow.target_id), (ALICE, BOB));

    store
        .set_follow_status(follow.id, FollowStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(
        store.follow_status(ALICE, BOB).await.unwrap(),
        FollowStatus::Accepted
    );
    assert_eq!(store.follow_counts(BOB).await.unwrap().followers, 1);
    assert!(store.pending_follow_requests(BOB).await.unwrap().is_empty());

    assert!(store.delete_follow(ALICE, BOB).await.unwrap());
    assert!(!store.delete_follow(ALICE, BOB).await.unwrap());
    assert_eq!(
        store.follow_status(ALICE, BOB).await.unwrap(),
        FollowStatus::None
    );
}
