use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{
        Book, Follow, FollowCounts, FollowRequest, FollowStatus, LikedAuthor, LovedBook,
        RatingAggregates, ReadingStatusEntry, ReviewEntry, SharedRating, Shelf, ShelfPlacement,
        ShelfWithBooks, User,
    },
    services::traits::TraitSignature,
};

/// Parameters for a candidate pool fetch
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    /// Match any of these authors, tags or genres
    pub signature: TraitSignature,
    /// The seed itself, never returned
    pub exclude_book_id: i64,
    /// Books the requesting user already shelved
    pub excluded_book_ids: HashSet<i64>,
    /// Maximum pool size
    pub limit: i64,
}

/// Read/write boundary to the relational store
///
/// Every method returning books returns them with authors, tags, genres and
/// the non-hidden rating aggregate already loaded. Implementations must not
/// require further fetches per book.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AffinityStore: Send + Sync {
    /// Fetch a user by id
    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>>;

    /// Fetch a book by id with associations and rating aggregate
    async fn get_book(&self, book_id: i64) -> AppResult<Option<Book>>;

    /// Books matching any trait of the signature, in store order, capped at `limit`
    async fn find_candidates(&self, query: &CandidateQuery) -> AppResult<Vec<Book>>;

    /// Ids of every book on any shelf of the user
    async fn shelved_book_ids(&self, user_id: i64) -> AppResult<HashSet<i64>>;

    /// Books on the user's "read" shelf that the user reviewed (non-hidden) with
    /// rating >= 4, most recently updated review first
    async fn loved_read_books(&self, user_id: i64) -> AppResult<Vec<Book>>;

    /// Status of the follow from requester to target, `None` when absent
    async fn follow_status(&self, requester_id: i64, target_id: i64) -> AppResult<FollowStatus>;

    /// Accepted follower and following totals
    async fn follow_counts(&self, user_id: i64) -> AppResult<FollowCounts>;

    /// Creates a follow with the given status unless one exists; returns the stored status
    async fn create_follow(
        &self,
        requester_id: i64,
        target_id: i64,
        status: FollowStatus,
    ) -> AppResult<FollowStatus>;

    /// Fetch a follow row by id
    async fn get_follow(&self, follow_id: i64) -> AppResult<Option<Follow>>;

    /// Pending follows targeting the user, newest first
    async fn pending_follow_requests(&self, target_id: i64) -> AppResult<Vec<FollowRequest>>;

    /// Updates the status of a stored follow
    async fn set_follow_status(&self, follow_id: i64, status: FollowStatus) -> AppResult<()>;

    /// Removes the follow from requester to target; false when none existed
    async fn delete_follow(&self, requester_id: i64, target_id: i64) -> AppResult<bool>;

    /// All shelves of a user with their books, system shelves first then by name
    async fn user_shelves(&self, user_id: i64) -> AppResult<Vec<ShelfWithBooks>>;

    /// Fetch a shelf by id
    async fn get_shelf(&self, shelf_id: i64) -> AppResult<Option<Shelf>>;

    /// Puts a book on a shelf, removing it from the owner's other system shelves
    /// when the target is a system shelf. Must be atomic.
    async fn place_book_on_shelf(&self, shelf: &Shelf, book_id: i64) -> AppResult<ShelfPlacement>;

    /// Books both users reviewed with non-hidden reviews
    async fn shared_ratings(&self, viewer_id: i64, target_id: i64) -> AppResult<Vec<SharedRating>>;

    /// Scalar sums over the same set `shared_ratings` returns
    async fn shared_rating_aggregates(
        &self,
        viewer_id: i64,
        target_id: i64,
    ) -> AppResult<RatingAggregates>;

    /// Books `lover_id` rated >= 4 (non-hidden) that `other_id` has neither reviewed
    /// nor given a reading status, by rating desc then title asc
    async fn loved_unread(&self, lover_id: i64, other_id: i64, limit: i64) -> AppResult<Vec<LovedBook>>;

    /// All reading-status entries of a user
    async fn reading_statuses(&self, user_id: i64) -> AppResult<Vec<ReadingStatusEntry>>;

    /// All non-hidden reviews written by a user
    async fn visible_reviews(&self, user_id: i64) -> AppResult<Vec<ReviewEntry>>;

    /// Authors the user liked, newest like first
    async fn liked_authors(&self, user_id: i64, limit: i64) -> AppResult<Vec<LikedAuthor>>;
}
