use crate::models::Book;

use super::traits::TraitSignature;

/// Flat bonus for sharing at least one author with the seed
pub const AUTHOR_WEIGHT: f64 = 3.0;
/// Bonus per shared tag
pub const TAG_WEIGHT: f64 = 1.0;
/// Bonus per shared genre
pub const GENRE_WEIGHT: f64 = 1.0;
/// Average rating at or above which a book counts as highly rated
pub const HIGHLY_RATED_THRESHOLD: f64 = 4.0;

/// Scores a candidate against a seed signature
///
/// Scores are unnormalised and only comparable within one candidate pool.
/// The rating term is the average rating divided by five, so it stays
/// within [0, 1] and never outweighs a shared author.
pub fn score_candidate(candidate: &Book, signature: &TraitSignature) -> f64 {
    let mut score = 0.0;
    if signature.shares_author(candidate) {
        score += AUTHOR_WEIGHT;
    }
    score += TAG_WEIGHT * signature.shared_tag_count(candidate) as f64;
    score += GENRE_WEIGHT * signature.shared_genre_count(candidate) as f64;
    score += candidate.rating_avg.unwrap_or(0.0) / 5.0;
    score
}

/// Human-readable explanation of why a candidate matched a seed
pub fn match_reasons(candidate: &Book, signature: &TraitSignature) -> Vec<String> {
    let mut reasons = Vec::new();
    if signature.shares_author(candidate) {
        reasons.push("Same author".to_string());
    }
    if signature.shared_genre_count(candidate) > 0 {
        reasons.push("Same genre".to_string());
    }
    if signature.shared_tag_count(candidate) > 0 {
        reasons.push("Similar tags".to_string());
    }
    if candidate
        .rating_avg
        .is_some_and(|avg| avg >= HIGHLY_RATED_THRESHOLD)
    {
        reasons.push("Highly rated".to_string());
    }
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_signature() -> TraitSignature {
        TraitSignature::from_book(
            &Book::new(1, "Seed")
                .with_authors(&[1, 2])
                .with_tags(&[10, 11, 12])
                .with_genres(&[100, 101]),
        )
    }

    #[test]
    fn test_author_bonus_is_binary() {
        let sig = seed_signature();
        let one = Book::new(2, "One author").with_authors(&[1]);
        let both = Book::new(3, "Both authors").with_authors(&[1, 2]);
        assert_eq!(score_candidate(&one, &sig), 3.0);
        assert_eq!(score_candidate(&both, &sig), 3.0);
    }

    #[test]
    fn test_tags_and_genres_are_additive() {
        let sig = seed_signature();
        let book = Book::new(2, "Tagged")
            .with_tags(&[10, 11, 99])
            .with_genres(&[100, 101]);
        assert_eq!(score_candidate(&book, &sig), 4.0);
    }

    #[test]
    fn test_rating_term_is_average_over_five() {
        let sig = seed_signature();
        let unrated = Book::new(2, "Unrated").with_tags(&[10]);
        let perfect = Book::new(3, "Perfect").with_tags(&[10]).with_rating(5.0, 12);
        assert_eq!(score_candidate(&unrated, &sig), 1.0);
        assert_eq!(score_candidate(&perfect, &sig), 2.0);
    }

    #[test]
    fn test_extra_shared_tag_adds_exactly_one() {
        let sig = seed_signature();
        let base = Book::new(2, "Base")
            .with_authors(&[1])
            .with_tags(&[10])
            .with_rating(3.5, 4);
        let richer = Book::new(2, "Base")
            .with_authors(&[1])
            .with_tags(&[10, 11])
            .with_rating(3.5, 4);
        let delta = score_candidate(&richer, &sig) - score_candidate(&base, &sig);
        assert!((delta - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_match_reasons_order() {
        let sig = seed_signature();
        let book = Book::new(2, "Everything")
            .with_authors(&[2])
            .with_tags(&[12])
            .with_genres(&[101])
            .with_rating(4.0, 3);
        assert_eq!(
            match_reasons(&book, &sig),
            vec!["Same author", "Same genre", "Similar tags", "Highly rated"]
        );
    }

    #[test]
    fn test_match_reasons_skip_low_ratings() {
        let sig = seed_signature();
        let book = Book::new(2, "Meh").with_tags(&[10]).with_rating(3.9, 10);
        assert_eq!(match_reasons(&book, &sig), vec!["Similar tags"]);
    }
}
