use serde::{Deserialize, Serialize};

/// Book author as embedded in book payloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

/// Free-form tag attached to books
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Catalog genre
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// A catalog book with its associations and non-hidden rating aggregate
///
/// Books handed to the engine always arrive with `authors`, `tags` and
/// `genres` loaded; an empty vector means the book has none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub published_year: Option<i32>,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub rating_avg: Option<f64>,
    #[serde(default)]
    pub rating_count: i64,
}

impl Book {
    /// Creates a bare book with no associations and no ratings
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            published_year: None,
            cover_url: None,
            authors: Vec::new(),
            tags: Vec::new(),
            genres: Vec::new(),
            rating_avg: None,
            rating_count: 0,
        }
    }

    pub fn with_authors(mut self, ids: &[i64]) -> Self {
        self.authors = ids
            .iter()
            .map(|&id| Author {
                id,
                name: format!("Author {}", id),
            })
            .collect();
        self
    }

    pub fn with_tags(mut self, ids: &[i64]) -> Self {
        self.tags = ids
            .iter()
            .map(|&id| Tag {
                id,
                name: format!("tag-{}", id),
            })
            .collect();
        self
    }

    pub fn with_genres(mut self, ids: &[i64]) -> Self {
        self.genres = ids
            .iter()
            .map(|&id| Genre {
                id,
                name: format!("Genre {}", id),
            })
            .collect();
        self
    }

    pub fn with_rating(mut self, avg: f64, count: i64) -> Self {
        self.rating_avg = Some(avg);
        self.rating_count = count;
        self
    }
}

/// Lightweight book reference used in shelf and activity payloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            cover_url: book.cover_url.clone(),
            authors: book.authors.clone(),
        }
    }
}
