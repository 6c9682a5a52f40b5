use std::collections::HashSet;

use crate::models::Book;

/// Comparison signature of a book: the ids of its authors, tags and genres
///
/// Built per request and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitSignature {
    pub author_ids: HashSet<i64>,
    pub tag_ids: HashSet<i64>,
    pub genre_ids: HashSet<i64>,
}

impl TraitSignature {
    /// Derives the signature from a book's loaded associations
    pub fn from_book(book: &Book) -> Self {
        Self {
            author_ids: book.authors.iter().map(|a| a.id).collect(),
            tag_ids: book.tags.iter().map(|t| t.id).collect(),
            genre_ids: book.genres.iter().map(|g| g.id).collect(),
        }
    }

    /// True when at least one author, tag or genre is present
    pub fn has_traits(&self) -> bool {
        !(self.author_ids.is_empty() && self.tag_ids.is_empty() && self.genre_ids.is_empty())
    }

    pub fn shares_author(&self, book: &Book) -> bool {
        book.authors.iter().any(|a| self.author_ids.contains(&a.id))
    }

    pub fn shared_tag_count(&self, book: &Book) -> usize {
        book.tags.iter().filter(|t| self.tag_ids.contains(&t.id)).count()
    }

    pub fn shared_genre_count(&self, book: &Book) -> usize {
        book.genres.iter().filter(|g| self.genre_ids.contains(&g.id)).count()
    }

    /// True when the candidate shares any author, tag or genre
    pub fn overlaps(&self, book: &Book) -> bool {
        self.shares_author(book) || self.shared_tag_count(book) > 0 || self.shared_genre_count(book) > 0
    }

    pub fn sorted_author_ids(&self) -> Vec<i64> {
        sorted(&self.author_ids)
    }

    pub fn sorted_tag_ids(&self) -> Vec<i64> {
        sorted(&self.tag_ids)
    }

    pub fn sorted_genre_ids(&self) -> Vec<i64> {
        sorted(&self.genre_ids)
    }
}

fn sorted(ids: &HashSet<i64>) -> Vec<i64> {
    let mut out: Vec<i64> = ids.iter().copied().collect();
    out.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_from_book() {
        let book = Book::new(1, "Dune")
            .with_authors(&[10])
            .with_tags(&[20, 21])
            .with_genres(&[30]);
        let sig = TraitSignature::from_book(&book);
        assert!(sig.has_traits());
        assert_eq!(sig.sorted_author_ids(), vec![10]);
        assert_eq!(sig.sorted_tag_ids(), vec![20, 21]);
        assert_eq!(sig.sorted_genre_ids(), vec![30]);
    }

    #[test]
    fn test_book_without_associations_has_no_traits() {
        let sig = TraitSignature::from_book(&Book::new(1, "Untagged"));
        assert!(!sig.has_traits());
        assert!(!sig.overlaps(&Book::new(2, "Other").with_tags(&[1])));
    }

    #[test]
    fn test_overlap_by_any_category() {
        let sig = TraitSignature::from_book(&Book::new(1, "Seed").with_genres(&[5]));
        assert!(sig.overlaps(&Book::new(2, "Same genre").with_genres(&[5, 6])));
        assert!(!sig.overlaps(&Book::new(3, "Unrelated").with_genres(&[6]).with_tags(&[5])));
    }
}
