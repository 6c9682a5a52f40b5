use serde::Serialize;

use super::Book;

/// A candidate book with its score against one seed signature
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBook {
    pub book: Book,
    pub score: f64,
}

/// Recommendations derived from a single seed book
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationSection {
    pub seed: Book,
    pub items: Vec<Book>,
}

/// A similar book and the trait categories that made it similar
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimilarBook {
    pub book: Book,
    pub reasons: Vec<String>,
}
