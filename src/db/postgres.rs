use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        Author, Book, BookSummary, Follow, FollowCounts, FollowRequest, FollowStatus, Genre,
        LikedAuthor, LovedBook, RatingAggregates, ReadingStatusEntry, ReviewEntry, SharedRating,
        Shelf, ShelfPlacement, ShelfWithBooks, Tag, User, UserSummary, READ_SHELF,
    },
    services::shelves::system_shelves_to_evict,
};

use super::store::{AffinityStore, CandidateQuery};

/// Creates a PostgreSQL connection pool
pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Book columns plus the rating aggregate over non-hidden reviews.
/// Callers append joins, filters and ordering.
const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.description, b.published_year, b.cover_url,
           r.rating_avg, COALESCE(r.rating_count, 0) AS rating_count
    FROM books b
    LEFT JOIN (
        SELECT book_id, AVG(rating)::float8 AS rating_avg, COUNT(*) AS rating_count
        FROM reviews
        WHERE NOT is_hidden
        GROUP BY book_id
    ) r ON r.book_id = b.id
"#;

/// Pairs of non-hidden reviews of the same book by both users; must match
/// the join in `shared_ratings`
const SHARED_REVIEWS: &str = r#"
    FROM reviews v
    JOIN reviews t ON t.book_id = v.book_id AND t.user_id = $2 AND NOT t.is_hidden
    WHERE v.user_id = $1 AND NOT v.is_hidden
"#;

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    is_private: bool,
    avatar_url: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            is_private: row.is_private,
            avatar_url: row.avatar_url,
        }
    }
}

#[derive(FromRow)]
struct BookRow {
    id: i64,
    title: String,
    description: Option<String>,
    published_year: Option<i32>,
    cover_url: Option<String>,
    rating_avg: Option<f64>,
    rating_count: i64,
}

/// One (book, associated entity) pair of a many-to-many table
#[derive(FromRow)]
struct LinkRow {
    book_id: i64,
    id: i64,
    name: String,
}

#[derive(FromRow)]
struct ShelfRow {
    id: i64,
    user_id: i64,
    name: String,
    is_system: bool,
    visibility: String,
}

impl TryFrom<ShelfRow> for Shelf {
    type Error = AppError;

    fn try_from(row: ShelfRow) -> Result<Self, Self::Error> {
        Ok(Shelf {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            is_system: row.is_system,
            visibility: row.visibility.parse().map_err(AppError::Internal)?,
        })
    }
}

#[derive(FromRow)]
struct ShelfBookRow {
    shelf_id: i64,
    id: i64,
    title: String,
    cover_url: Option<String>,
}

#[derive(FromRow)]
struct SharedRatingRow {
    book_id: i64,
    title: String,
    viewer_rating: i32,
    target_rating: i32,
}

#[derive(FromRow)]
struct AggregateRow {
    count: i64,
    sum_abs_diff: f64,
    sum_x: f64,
    sum_y: f64,
    sum_x2: f64,
    sum_y2: f64,
    sum_xy: f64,
}

#[derive(FromRow)]
struct LovedRow {
    book_id: i64,
    title: String,
    cover_url: Option<String>,
    rating: i32,
}

#[derive(FromRow)]
struct StatusRow {
    user_id: i64,
    status: String,
    updated_at: DateTime<Utc>,
    book_id: i64,
    title: String,
    cover_url: Option<String>,
}

#[derive(FromRow)]
struct ReviewRow {
    user_id: i64,
    rating: i32,
    body: Option<String>,
    updated_at: DateTime<Utc>,
    book_id: i64,
    title: String,
    cover_url: Option<String>,
}

#[derive(FromRow)]
struct LikedAuthorRow {
    id: i64,
    name: String,
    photo_url: Option<String>,
    liked_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CountsRow {
    followers: i64,
    following: i64,
}

#[derive(FromRow)]
struct FollowRow {
    id: i64,
    requester_id: i64,
    target_id: i64,
    status: String,
}

impl TryFrom<FollowRow> for Follow {
    type Error = AppError;

    fn try_from(row: FollowRow) -> Result<Self, Self::Error> {
        Ok(Follow {
            id: row.id,
            requester_id: row.requester_id,
            target_id: row.target_id,
            status: row.status.parse().map_err(AppError::Internal)?,
        })
    }
}

#[derive(FromRow)]
struct FollowRequestRow {
    id: i64,
    created_at: DateTime<Utc>,
    requester_id: i64,
    username: String,
    avatar_url: Option<String>,
}

impl From<FollowRequestRow> for FollowRequest {
    fn from(row: FollowRequestRow) -> Self {
        FollowRequest {
            id: row.id,
            requester: UserSummary {
                id: row.requester_id,
                username: row.username,
                avatar_url: row.avatar_url,
            },
            created_at: row.created_at,
        }
    }
}

fn group_links(rows: Vec<LinkRow>) -> HashMap<i64, Vec<(i64, String)>> {
    let mut grouped: HashMap<i64, Vec<(i64, String)>> = HashMap::new();
    for row in rows {
        grouped.entry(row.book_id).or_default().push((row.id, row.name));
    }
    grouped
}

fn summary(
    id: i64,
    title: String,
    cover_url: Option<String>,
    authors: &HashMap<i64, Vec<Author>>,
) -> BookSummary {
    BookSummary {
        id,
        title,
        cover_url,
        authors: authors.get(&id).cloned().unwrap_or_default(),
    }
}

/// PostgreSQL-backed store
///
/// Book associations are loaded in one batched query per association kind,
/// never per book.
#[derive(Clone)]
pub struct PgAffinityStore {
    pool: PgPool,
}

impl PgAffinityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn links(&self, sql: &str, book_ids: &[i64]) -> AppResult<HashMap<i64, Vec<(i64, String)>>> {
        if book_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<LinkRow> = sqlx::query_as(sql)
            .bind(book_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(group_links(rows))
    }

    async fn authors_for(&self, book_ids: &[i64]) -> AppResult<HashMap<i64, Vec<Author>>> {
        let links = self
            .links(
                "SELECT ba.book_id, a.id, a.name FROM book_authors ba \
                 JOIN authors a ON a.id = ba.author_id \
                 WHERE ba.book_id = ANY($1) ORDER BY a.name, a.id",
                book_ids,
            )
            .await?;
        Ok(links
            .into_iter()
            .map(|(book_id, items)| {
                let authors = items.into_iter().map(|(id, name)| Author { id, name }).collect();
                (book_id, authors)
            })
            .collect())
    }

    /// Attaches authors, tags and genres to a batch of book rows, keeping row order
    async fn hydrate(&self, rows: Vec<BookRow>) -> AppResult<Vec<Book>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut authors = self.authors_for(&ids).await?;
        let mut tags = self
            .links(
                "SELECT bt.book_id, t.id, t.name FROM book_tags bt \
                 JOIN tags t ON t.id = bt.tag_id \
                 WHERE bt.book_id = ANY($1) ORDER BY t.name, t.id",
                &ids,
            )
            .await?;
        let mut genres = self
            .links(
                "SELECT bg.book_id, g.id, g.name FROM book_genres bg \
                 JOIN genres g ON g.id = bg.genre_id \
                 WHERE bg.book_id = ANY($1) ORDER BY g.name, g.id",
                &ids,
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Book {
                id: row.id,
                title: row.title,
                description: row.description,
                published_year: row.published_year,
                cover_url: row.cover_url,
                authors: authors.remove(&row.id).unwrap_or_default(),
                tags: tags
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(id, name)| Tag { id, name })
                    .collect(),
                genres: genres
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(id, name)| Genre { id, name })
                    .collect(),
                rating_avg: row.rating_avg,
                rating_count: row.rating_count,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl AffinityStore for PgAffinityStore {
    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, is_private, avatar_url FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn get_book(&self, book_id: i64) -> AppResult<Option<Book>> {
        let sql = format!("{} WHERE b.id = $1", BOOK_SELECT);
        let rows: Vec<BookRow> = sqlx::query_as(&sql)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(self.hydrate(rows).await?.into_iter().next())
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> AppResult<Vec<Book>> {
        if !query.signature.has_traits() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"{}
            WHERE b.id <> $1
              AND NOT (b.id = ANY($2))
              AND (
                EXISTS (SELECT 1 FROM book_authors x WHERE x.book_id = b.id AND x.author_id = ANY($3))
                OR EXISTS (SELECT 1 FROM book_tags x WHERE x.book_id = b.id AND x.tag_id = ANY($4))
                OR EXISTS (SELECT 1 FROM book_genres x WHERE x.book_id = b.id AND x.genre_id = ANY($5))
              )
            ORDER BY b.id
            LIMIT $6"#,
            BOOK_SELECT
        );
        let excluded: Vec<i64> = query.excluded_book_ids.iter().copied().collect();

        let rows: Vec<BookRow> = sqlx::query_as(&sql)
            .bind(query.exclude_book_id)
            .bind(&excluded)
            .bind(query.signature.sorted_author_ids())
            .bind(query.signature.sorted_tag_ids())
            .bind(query.signature.sorted_genre_ids())
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            seed_id = query.exclude_book_id,
            pool_size = rows.len(),
            "Fetched candidate pool"
        );
        self.hydrate(rows).await
    }

    async fn shelved_book_ids(&self, user_id: i64) -> AppResult<HashSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT DISTINCT sb.book_id FROM shelf_books sb \
             JOIN shelves s ON s.id = sb.shelf_id WHERE s.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    async fn loved_read_books(&self, user_id: i64) -> AppResult<Vec<Book>> {
        let sql = format!(
            r#"{}
            JOIN shelf_books sb ON sb.book_id = b.id
            JOIN shelves s ON s.id = sb.shelf_id
                AND s.user_id = $1 AND s.is_system AND s.name = $2
            JOIN reviews rv ON rv.book_id = b.id
                AND rv.user_id = $1 AND NOT rv.is_hidden AND rv.rating >= 4
            ORDER BY rv.updated_at DESC, b.id"#,
            BOOK_SELECT
        );
        let rows: Vec<BookRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(READ_SHELF)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn follow_status(&self, requester_id: i64, target_id: i64) -> AppResult<FollowStatus> {
        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM follows WHERE requester_id = $1 AND target_id = $2",
        )
        .bind(requester_id)
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;

        match status {
            Some(s) => s.parse().map_err(AppError::Internal),
            None => Ok(FollowStatus::None),
        }
    }

    async fn follow_counts(&self, user_id: i64) -> AppResult<FollowCounts> {
        let row: CountsRow = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM follows WHERE target_id = $1 AND status = 'accepted') AS followers,
                (SELECT COUNT(*) FROM follows WHERE requester_id = $1 AND status = 'accepted') AS following
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(FollowCounts {
            followers: row.followers,
            following: row.following,
        })
    }

    async fn create_follow(
        &self,
        requester_id: i64,
        target_id: i64,
        status: FollowStatus,
    ) -> AppResult<FollowStatus> {
        if status == FollowStatus::None {
            return Err(AppError::Internal("Cannot store an empty follow".to_string()));
        }

        let inserted: Option<String> = sqlx::query_scalar(
            r#"
            INSERT INTO follows (requester_id, target_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (requester_id, target_id) DO NOTHING
            RETURNING status
            "#,
        )
        .bind(requester_id)
        .bind(target_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(s) => s.parse().map_err(AppError::Internal),
            // lost a race with a concurrent request; report what is stored
            None => self.follow_status(requester_id, target_id).await,
        }
    }

    async fn get_follow(&self, follow_id: i64) -> AppResult<Option<Follow>> {
        let row: Option<FollowRow> = sqlx::query_as(
            "SELECT id, requester_id, target_id, status FROM follows WHERE id = $1",
        )
        .bind(follow_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Follow::try_from).transpose()
    }

    async fn pending_follow_requests(&self, target_id: i64) -> AppResult<Vec<FollowRequest>> {
        let rows: Vec<FollowRequestRow> = sqlx::query_as(
            r#"
            SELECT f.id, f.created_at, u.id AS requester_id, u.username, u.avatar_url
            FROM follows f
            JOIN users u ON u.id = f.requester_id
            WHERE f.target_id = $1 AND f.status = 'pending'
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(target_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FollowRequest::from).collect())
    }

    async fn set_follow_status(&self, follow_id: i64, status: FollowStatus) -> AppResult<()> {
        if status == FollowStatus::None {
            return Err(AppError::Internal("Cannot store an empty follow".to_string()));
        }

        sqlx::query("UPDATE follows SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(follow_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_follow(&self, requester_id: i64, target_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE requester_id = $1 AND target_id = $2")
            .bind(requester_id)
            .bind(target_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn user_shelves(&self, user_id: i64) -> AppResult<Vec<ShelfWithBooks>> {
        let rows: Vec<ShelfRow> = sqlx::query_as(
            "SELECT id, user_id, name, is_system, visibility FROM shelves \
             WHERE user_id = $1 ORDER BY is_system DESC, name, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        let shelves: Vec<Shelf> = rows
            .into_iter()
            .map(Shelf::try_from)
            .collect::<AppResult<_>>()?;

        let shelf_ids: Vec<i64> = shelves.iter().map(|s| s.id).collect();
        let book_rows: Vec<ShelfBookRow> = if shelf_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as(
                "SELECT sb.shelf_id, b.id, b.title, b.cover_url FROM shelf_books sb \
                 JOIN books b ON b.id = sb.book_id \
                 WHERE sb.shelf_id = ANY($1) ORDER BY sb.added_at DESC, b.id",
            )
            .bind(&shelf_ids)
            .fetch_all(&self.pool)
            .await?
        };

        let book_ids: Vec<i64> = book_rows.iter().map(|r| r.id).collect();
        let authors = self.authors_for(&book_ids).await?;
        let mut books_by_shelf: HashMap<i64, Vec<BookSummary>> = HashMap::new();
        for row in book_rows {
            books_by_shelf
                .entry(row.shelf_id)
                .or_default()
                .push(summary(row.id, row.title, row.cover_url, &authors));
        }

        Ok(shelves
            .into_iter()
            .map(|shelf| {
                let books = books_by_shelf.remove(&shelf.id).unwrap_or_default();
                ShelfWithBooks { shelf, books }
            })
            .collect())
    }

    async fn get_shelf(&self, shelf_id: i64) -> AppResult<Option<Shelf>> {
        let row: Option<ShelfRow> = sqlx::query_as(
            "SELECT id, user_id, name, is_system, visibility FROM shelves WHERE id = $1",
        )
        .bind(shelf_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Shelf::try_from).transpose()
    }

    async fn place_book_on_shelf(&self, shelf: &Shelf, book_id: i64) -> AppResult<ShelfPlacement> {
        let mut tx = self.pool.begin().await?;

        // serialises concurrent placements for the same owner
        let owned: Vec<ShelfRow> = sqlx::query_as(
            "SELECT id, user_id, name, is_system, visibility FROM shelves \
             WHERE user_id = $1 AND is_system ORDER BY id FOR UPDATE",
        )
        .bind(shelf.user_id)
        .fetch_all(&mut *tx)
        .await?;
        let owned: Vec<Shelf> = owned
            .into_iter()
            .map(Shelf::try_from)
            .collect::<AppResult<_>>()?;

        let candidates = system_shelves_to_evict(shelf, &owned);
        let mut evicted_from: Vec<i64> = if candidates.is_empty() {
            Vec::new()
        } else {
            sqlx::query_scalar(
                "DELETE FROM shelf_books WHERE book_id = $1 AND shelf_id = ANY($2) RETURNING shelf_id",
            )
            .bind(book_id)
            .bind(&candidates)
            .fetch_all(&mut *tx)
            .await?
        };
        evicted_from.sort_unstable();

        sqlx::query(
            "INSERT INTO shelf_books (shelf_id, book_id) VALUES ($1, $2) \
             ON CONFLICT (shelf_id, book_id) DO NOTHING",
        )
        .bind(shelf.id)
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ShelfPlacement {
            shelf_id: shelf.id,
            book_id,
            evicted_from,
        })
    }

    async fn shared_ratings(&self, viewer_id: i64, target_id: i64) -> AppResult<Vec<SharedRating>> {
        let rows: Vec<SharedRatingRow> = sqlx::query_as(
            r#"
            SELECT b.id AS book_id, b.title, v.rating AS viewer_rating, t.rating AS target_rating
            FROM reviews v
            JOIN reviews t ON t.book_id = v.book_id AND t.user_id = $2 AND NOT t.is_hidden
            JOIN books b ON b.id = v.book_id
            WHERE v.user_id = $1 AND NOT v.is_hidden
            ORDER BY b.id
            "#,
        )
        .bind(viewer_id)
        .bind(target_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| SharedRating::new(r.book_id, r.title, r.viewer_rating, r.target_rating))
            .collect())
    }

    async fn shared_rating_aggregates(
        &self,
        viewer_id: i64,
        target_id: i64,
    ) -> AppResult<RatingAggregates> {
        let sql = format!(
            r#"
            SELECT
                COUNT(*) AS count,
                COALESCE(SUM(ABS(v.rating - t.rating)), 0)::float8 AS sum_abs_diff,
                COALESCE(SUM(v.rating), 0)::float8 AS sum_x,
                COALESCE(SUM(t.rating), 0)::float8 AS sum_y,
                COALESCE(SUM(v.rating * v.rating), 0)::float8 AS sum_x2,
                COALESCE(SUM(t.rating * t.rating), 0)::float8 AS sum_y2,
                COALESCE(SUM(v.rating * t.rating), 0)::float8 AS sum_xy
            {}"#,
            SHARED_REVIEWS
        );
        let row: AggregateRow = sqlx::query_as(&sql)
            .bind(viewer_id)
            .bind(target_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(RatingAggregates {
            count: row.count,
            sum_abs_diff: row.sum_abs_diff,
            sum_x: row.sum_x,
            sum_y: row.sum_y,
            sum_x2: row.sum_x2,
            sum_y2: row.sum_y2,
            sum_xy: row.sum_xy,
        })
    }

    async fn loved_unread(&self, lover_id: i64, other_id: i64, limit: i64) -> AppResult<Vec<LovedBook>> {
        let rows: Vec<LovedRow> = sqlx::query_as(
            r#"
            SELECT b.id AS book_id, b.title, b.cover_url, r.rating
            FROM reviews r
            JOIN books b ON b.id = r.book_id
            WHERE r.user_id = $1 AND NOT r.is_hidden AND r.rating >= 4
              AND NOT EXISTS (SELECT 1 FROM reviews o WHERE o.user_id = $2 AND o.book_id = r.book_id)
              AND NOT EXISTS (SELECT 1 FROM reading_statuses s WHERE s.user_id = $2 AND s.book_id = r.book_id)
            ORDER BY r.rating DESC, b.title ASC, b.id
            LIMIT $3
            "#,
        )
        .bind(lover_id)
        .bind(other_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let book_ids: Vec<i64> = rows.iter().map(|r| r.book_id).collect();
        let mut authors = self.authors_for(&book_ids).await?;
        Ok(rows
            .into_iter()
            .map(|r| LovedBook {
                authors: authors.remove(&r.book_id).unwrap_or_default(),
                book_id: r.book_id,
                title: r.title,
                cover_url: r.cover_url,
                rating: r.rating,
            })
            .collect())
    }

    async fn reading_statuses(&self, user_id: i64) -> AppResult<Vec<ReadingStatusEntry>> {
        let rows: Vec<StatusRow> = sqlx::query_as(
            r#"
            SELECT rs.user_id, rs.status, rs.updated_at, b.id AS book_id, b.title, b.cover_url
            FROM reading_statuses rs
            JOIN books b ON b.id = rs.book_id
            WHERE rs.user_id = $1
            ORDER BY rs.updated_at DESC, rs.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let book_ids: Vec<i64> = rows.iter().map(|r| r.book_id).collect();
        let authors = self.authors_for(&book_ids).await?;
        rows.into_iter()
            .map(|r| -> AppResult<ReadingStatusEntry> {
                Ok(ReadingStatusEntry {
                    user_id: r.user_id,
                    status: r.status.parse().map_err(AppError::Internal)?,
                    updated_at: r.updated_at,
                    book: summary(r.book_id, r.title, r.cover_url, &authors),
                })
            })
            .collect()
    }

    async fn visible_reviews(&self, user_id: i64) -> AppResult<Vec<ReviewEntry>> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r#"
            SELECT r.user_id, r.rating, r.body, r.updated_at, b.id AS book_id, b.title, b.cover_url
            FROM reviews r
            JOIN books b ON b.id = r.book_id
            WHERE r.user_id = $1 AND NOT r.is_hidden
            ORDER BY r.updated_at DESC, r.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let book_ids: Vec<i64> = rows.iter().map(|r| r.book_id).collect();
        let authors = self.authors_for(&book_ids).await?;
        Ok(rows
            .into_iter()
            .map(|r| ReviewEntry {
                user_id: r.user_id,
                rating: r.rating,
                body: r.body,
                updated_at: r.updated_at,
                book: summary(r.book_id, r.title, r.cover_url, &authors),
            })
            .collect())
    }

    async fn liked_authors(&self, user_id: i64, limit: i64) -> AppResult<Vec<LikedAuthor>> {
        let rows: Vec<LikedAuthorRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.name, a.photo_url, al.created_at AS liked_at
            FROM author_likes al
            JOIN authors a ON a.id = al.author_id
            WHERE al.user_id = $1
            ORDER BY al.created_at DESC, a.id
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LikedAuthor {
                id: r.id,
                name: r.name,
                photo_url: r.photo_url,
                liked_at: r.liked_at,
            })
            .collect())
    }
}
