use std::collections::{HashMap, HashSet};

use crate::{
    db::{AffinityStore, CandidateQuery},
    error::{AppError, AppResult},
    models::{Book, RecommendationSection, ScoredBook, SimilarBook},
};

use super::{
    paginate,
    scoring::{match_reasons, score_candidate},
    traits::TraitSignature,
};

/// Candidate pool cap for the public "similar books" view
pub const SIMILAR_POOL_CAP: i64 = 60;
/// Candidate pool cap per seed for personalized recommendations
pub const PERSONAL_POOL_CAP: i64 = 50;

/// Filters, scores and orders a candidate pool for one seed
///
/// Drops the seed, excluded books, duplicates and candidates without any
/// trait overlap. Sorting is stable so equal scores keep store order.
pub fn rank_candidates(
    seed_id: i64,
    signature: &TraitSignature,
    candidates: Vec<Book>,
    excluded: &HashSet<i64>,
    limit: usize,
) -> Vec<ScoredBook> {
    let mut seen = HashSet::new();
    let mut scored: Vec<ScoredBook> = candidates
        .into_iter()
        .filter(|book| book.id != seed_id && !excluded.contains(&book.id))
        .filter(|book| signature.overlaps(book))
        .filter(|book| seen.insert(book.id))
        .map(|book| {
            let score = score_candidate(&book, signature);
            ScoredBook { book, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// Merges per-seed rankings keeping each book's best score
///
/// A book keeps the position of its first appearance; a later, strictly
/// higher score only replaces the score. The result is sorted by score
/// descending with a stable sort.
pub fn merge_by_max_score<I>(rankings: I) -> Vec<ScoredBook>
where
    I: IntoIterator<Item = Vec<ScoredBook>>,
{
    let mut merged: Vec<ScoredBook> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for ranking in rankings {
        for item in ranking {
            match index.get(&item.book.id) {
                Some(&pos) => {
                    if item.score > merged[pos].score {
                        merged[pos] = item;
                    }
                }
                None => {
                    index.insert(item.book.id, merged.len());
                    merged.push(item);
                }
            }
        }
    }

    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged
}

/// Fetches and ranks candidates for a single seed
async fn recommend_for_seed(
    store: &dyn AffinityStore,
    seed: &Book,
    excluded: &HashSet<i64>,
    limit: usize,
) -> AppResult<Vec<ScoredBook>> {
    let signature = TraitSignature::from_book(seed);
    if !signature.has_traits() {
        tracing::debug!(seed_id = seed.id, "Seed has no traits, skipping");
        return Ok(Vec::new());
    }

    let query = CandidateQuery {
        signature,
        exclude_book_id: seed.id,
        excluded_book_ids: excluded.clone(),
        limit: PERSONAL_POOL_CAP,
    };
    let candidates = store.find_candidates(&query).await?;

    tracing::debug!(
        seed_id = seed.id,
        pool_size = candidates.len(),
        "Candidate pool fetched"
    );

    Ok(rank_candidates(
        seed.id,
        &query.signature,
        candidates,
        excluded,
        limit,
    ))
}

/// One recommendation section per loved seed, most recently reviewed seed first
///
/// Seeds are truncated to `sections` before any candidates are fetched.
pub async fn recommendation_sections(
    store: &dyn AffinityStore,
    user_id: i64,
    sections: usize,
    per: usize,
) -> AppResult<Vec<RecommendationSection>> {
    let mut seeds = store.loved_read_books(user_id).await?;
    seeds.truncate(sections);

    if seeds.is_empty() {
        return Ok(Vec::new());
    }

    let excluded = store.shelved_book_ids(user_id).await?;

    let mut out = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let items = recommend_for_seed(store, &seed, &excluded, per)
            .await?
            .into_iter()
            .map(|scored| scored.book)
            .collect();
        out.push(RecommendationSection { seed, items });
    }

    tracing::info!(
        user_id = user_id,
        sections = out.len(),
        "Built recommendation sections"
    );

    Ok(out)
}

/// Ranked, deduplicated recommendations across every loved seed
pub async fn recommendation_list(
    store: &dyn AffinityStore,
    user_id: i64,
    limit: usize,
    offset: usize,
) -> AppResult<Vec<Book>> {
    let seeds = store.loved_read_books(user_id).await?;
    if seeds.is_empty() {
        return Ok(Vec::new());
    }

    let excluded = store.shelved_book_ids(user_id).await?;

    let mut rankings = Vec::with_capacity(seeds.len());
    for seed in &seeds {
        rankings.push(recommend_for_seed(store, seed, &excluded, PERSONAL_POOL_CAP as usize).await?);
    }

    let merged = merge_by_max_score(rankings);

    tracing::info!(
        user_id = user_id,
        seeds = seeds.len(),
        merged = merged.len(),
        "Built recommendation list"
    );

    Ok(paginate(merged, offset, limit)
        .into_iter()
        .map(|scored| scored.book)
        .collect())
}

/// Books similar to `book_id` with the reasons they matched
pub async fn similar_books(
    store: &dyn AffinityStore,
    book_id: i64,
    limit: usize,
) -> AppResult<Vec<SimilarBook>> {
    let seed = store
        .get_book(book_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

    let signature = TraitSignature::from_book(&seed);
    if !signature.has_traits() {
        return Ok(Vec::new());
    }

    let query = CandidateQuery {
        signature,
        exclude_book_id: seed.id,
        excluded_book_ids: HashSet::new(),
        limit: SIMILAR_POOL_CAP,
    };
    let candidates = store.find_candidates(&query).await?;
    let ranked = rank_candidates(
        seed.id,
        &query.signature,
        candidates,
        &query.excluded_book_ids,
        limit,
    );

    Ok(ranked
        .into_iter()
        .map(|scored| {
            let reasons = match_reasons(&scored.book, &query.signature);
            SimilarBook {
                book: scored.book,
                reasons,
            }
        })
        .collect())
}
