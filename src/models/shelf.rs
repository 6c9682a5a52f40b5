use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::BookSummary;

/// Name of the system shelf that holds finished books
pub const READ_SHELF: &str = "read";

/// Who may see a shelf besides its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShelfVisibility {
    Private,
    Followers,
    Public,
}

impl ShelfVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShelfVisibility::Private => "private",
            ShelfVisibility::Followers => "followers",
            ShelfVisibility::Public => "public",
        }
    }
}

impl Display for ShelfVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShelfVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(ShelfVisibility::Private),
            "followers" => Ok(ShelfVisibility::Followers),
            "public" => Ok(ShelfVisibility::Public),
            other => Err(format!("Unknown shelf visibility: {}", other)),
        }
    }
}

/// A user-owned shelf
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shelf {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub is_system: bool,
    pub visibility: ShelfVisibility,
}

/// A shelf together with the books on it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShelfWithBooks {
    #[serde(flatten)]
    pub shelf: Shelf,
    pub books: Vec<BookSummary>,
}

/// Outbound shelf payload for another user's profile
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShelfOut {
    pub id: i64,
    pub name: String,
    pub is_system: bool,
    pub visibility: ShelfVisibility,
    pub book_count: usize,
    pub books: Vec<BookSummary>,
}

impl From<ShelfWithBooks> for ShelfOut {
    fn from(value: ShelfWithBooks) -> Self {
        Self {
            id: value.shelf.id,
            name: value.shelf.name,
            is_system: value.shelf.is_system,
            visibility: value.shelf.visibility,
            book_count: value.books.len(),
            books: value.books,
        }
    }
}

/// Result of placing a book on a shelf
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShelfPlacement {
    pub shelf_id: i64,
    pub book_id: i64,
    /// System shelves the book was removed from
    pub evicted_from: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_round_trips_through_str() {
        for v in [
            ShelfVisibility::Private,
            ShelfVisibility::Followers,
            ShelfVisibility::Public,
        ] {
            assert_eq!(v.as_str().parse::<ShelfVisibility>().unwrap(), v);
        }
        assert!("friends".parse::<ShelfVisibility>().is_err());
    }

    #[test]
    fn test_shelf_out_counts_books() {
        let shelf = ShelfWithBooks {
            shelf: Shelf {
                id: 1,
                user_id: 7,
                name: "read".to_string(),
                is_system: true,
                visibility: ShelfVisibility::Public,
            },
            books: vec![BookSummary {
                id: 3,
                title: "Dune".to_string(),
                cover_url: None,
                authors: vec![],
            }],
        };
        let out = ShelfOut::from(shelf);
        assert_eq!(out.book_count, 1);
        assert_eq!(out.name, "read");
    }
}
