use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::{Author, UserSummary};

/// One book rated (non-hidden) by both compared users
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharedRating {
    pub book_id: i64,
    pub title: String,
    pub viewer_rating: i32,
    pub target_rating: i32,
    pub diff: i32,
}

impl SharedRating {
    pub fn new(book_id: i64, title: impl Into<String>, viewer_rating: i32, target_rating: i32) -> Self {
        Self {
            book_id,
            title: title.into(),
            viewer_rating,
            target_rating,
            diff: (viewer_rating - target_rating).abs(),
        }
    }

    /// Sum of both ratings; orders pairs by their average rating
    pub fn rating_sum(&self) -> i32 {
        self.viewer_rating + self.target_rating
    }

    pub fn max_rating(&self) -> i32 {
        self.viewer_rating.max(self.target_rating)
    }
}

/// Scalar sums over the shared-rating set, as a SQL aggregate would produce them
///
/// `x` is the viewer's rating and `y` the target's.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingAggregates {
    pub count: i64,
    pub sum_abs_diff: f64,
    pub sum_x: f64,
    pub sum_y: f64,
    pub sum_x2: f64,
    pub sum_y2: f64,
    pub sum_xy: f64,
}

impl RatingAggregates {
    /// Folds raw pairs into aggregates
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a SharedRating>) -> Self {
        pairs.into_iter().fold(Self::default(), |mut acc, pair| {
            let x = f64::from(pair.viewer_rating);
            let y = f64::from(pair.target_rating);
            acc.count += 1;
            acc.sum_abs_diff += f64::from(pair.diff);
            acc.sum_x += x;
            acc.sum_y += y;
            acc.sum_x2 += x * x;
            acc.sum_y2 += y * y;
            acc.sum_xy += x * y;
            acc
        })
    }

    /// Mean absolute rating difference, 0.0 for an empty set
    pub fn mean_abs_diff(&self) -> f64 {
        if self.count <= 0 {
            return 0.0;
        }
        self.sum_abs_diff / self.count as f64
    }
}

/// Caller-selectable ordering for the shared ratings page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedSort {
    #[default]
    DiffDesc,
    DiffAsc,
    Title,
    ViewerRating,
    TargetRating,
}

impl SharedSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            SharedSort::DiffDesc => "diff_desc",
            SharedSort::DiffAsc => "diff_asc",
            SharedSort::Title => "title",
            SharedSort::ViewerRating => "viewer_rating",
            SharedSort::TargetRating => "target_rating",
        }
    }
}

impl Display for SharedSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SharedSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diff_desc" => Ok(SharedSort::DiffDesc),
            "diff_asc" => Ok(SharedSort::DiffAsc),
            "title" => Ok(SharedSort::Title),
            "viewer_rating" => Ok(SharedSort::ViewerRating),
            "target_rating" => Ok(SharedSort::TargetRating),
            _ => Err("Invalid sort option".to_string()),
        }
    }
}

/// A book one user rated highly that the other has not touched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LovedBook {
    pub book_id: i64,
    pub title: String,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    pub rating: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ViewerLovedRow {
    pub book_id: i64,
    pub title: String,
    pub cover_url: Option<String>,
    pub authors: Vec<Author>,
    pub viewer_rating: i32,
}

impl From<LovedBook> for ViewerLovedRow {
    fn from(book: LovedBook) -> Self {
        Self {
            book_id: book.book_id,
            title: book.title,
            cover_url: book.cover_url,
            authors: book.authors,
            viewer_rating: book.rating,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TargetLovedRow {
    pub book_id: i64,
    pub title: String,
    pub cover_url: Option<String>,
    pub authors: Vec<Author>,
    pub target_rating: i32,
}

impl From<LovedBook> for TargetLovedRow {
    fn from(book: LovedBook) -> Self {
        Self {
            book_id: book.book_id,
            title: book.title,
            cover_url: book.cover_url,
            authors: book.authors,
            target_rating: book.rating,
        }
    }
}

/// Full taste comparison between a viewer and a target user
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TasteComparison {
    pub viewer: UserSummary,
    pub target: UserSummary,
    pub common_count: i64,
    pub similarity_score: f64,
    pub mean_abs_diff: f64,
    pub pearson: Option<f64>,
    pub agreements: Vec<SharedRating>,
    pub disagreements: Vec<SharedRating>,
    pub viewer_loved_target_unread: Vec<ViewerLovedRow>,
    pub target_loved_viewer_unread: Vec<TargetLovedRow>,
    pub shared_ratings: Vec<SharedRating>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_rating_diff_is_absolute() {
        let row = SharedRating::new(1, "Beta", 1, 5);
        assert_eq!(row.diff, 4);
        assert_eq!(row.max_rating(), 5);
        assert_eq!(row.rating_sum(), 6);
    }

    #[test]
    fn test_aggregates_from_pairs() {
        let rows = vec![
            SharedRating::new(1, "Alpha", 5, 4),
            SharedRating::new(2, "Beta", 1, 5),
            SharedRating::new(3, "Gamma", 4, 4),
        ];
        let agg = RatingAggregates::from_pairs(&rows);
        assert_eq!(agg.count, 3);
        assert_eq!(agg.sum_x, 10.0);
        assert_eq!(agg.sum_y, 13.0);
        assert_eq!(agg.sum_xy, 20.0 + 5.0 + 16.0);
        assert!((agg.mean_abs_diff() - 5.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_aggregates_have_zero_mean() {
        assert_eq!(RatingAggregates::default().mean_abs_diff(), 0.0);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("diff_asc".parse::<SharedSort>().unwrap(), SharedSort::DiffAsc);
        assert_eq!(SharedSort::default(), SharedSort::DiffDesc);
        assert!("rating".parse::<SharedSort>().is_err());
    }
}
