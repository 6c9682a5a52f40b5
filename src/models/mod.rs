pub mod activity;
pub mod book;
pub mod recommendation;
pub mod shelf;
pub mod social;
pub mod taste;

pub use activity::{
    ActivityItem, ActivityKind, ReadingState, ReadingStatusEntry, ReviewEntry,
};
pub use book::{Author, Book, BookSummary, Genre, Tag};
pub use recommendation::{RecommendationSection, ScoredBook, SimilarBook};
pub use shelf::{
    Shelf, ShelfOut, ShelfPlacement, ShelfVisibility, ShelfWithBooks, READ_SHELF,
};
pub use social::{
    Follow, FollowCounts, FollowOutcome, FollowRequest, FollowStatus, LikedAuthor, Profile, User,
    UserSummary,
};
pub use taste::{
    LovedBook, RatingAggregates, SharedRating, SharedSort, TargetLovedRow, TasteComparison,
    ViewerLovedRow,
};
