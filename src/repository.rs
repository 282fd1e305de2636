//! SQLite persistence for cards.
//!
//! `tags` and `code_snippet` are stored as JSON text; a missing snippet is a
//! SQL `NULL`. Title search goes through the `cards_fts` FTS5 index.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};

use crate::error::{AppError, Result};
use crate::models::{Card, CardSearch, CodeSnippet, Metadata, NewCard};
use crate::scheduler;

/// Row shape shared by every card query.
#[derive(FromRow)]
struct CardRow {
    id: i64,
    created_at: DateTime<Utc>,
    title: String,
    tags: Json<Vec<String>>,
    content: String,
    next_review_date: NaiveDate,
    code_snippet: Option<Json<CodeSnippet>>,
    description: Option<String>,
}

impl From<CardRow> for Card {
    fn from(row: CardRow) -> Self {
        Card {
            id: row.id,
            created_at: row.created_at,
            title: row.title,
            tags: row.tags.0,
            content: row.content,
            next_review_date: row.next_review_date,
            code_snippet: row.code_snippet.map(|Json(s)| s),
            description: row.description,
        }
    }
}

/// Listing row carrying the window count of the filtered set.
#[derive(FromRow)]
struct CardWithCount {
    total_records: i64,
    #[sqlx(flatten)]
    card: CardRow,
}

const CARD_COLUMNS: &str =
    "id, created_at, title, tags, content, next_review_date, code_snippet, description";

/// Turn free text into an FTS5 query requiring every word.
///
/// Words are quoted so that FTS5 operators in user input are matched literally.
/// Returns `None` when the text has no searchable words.
fn title_match_expr(title: &str) -> Option<String> {
    let words: Vec<String> = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| format!("\"{w}\""))
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

#[derive(Clone)]
pub struct CardRepository {
    pool: SqlitePool,
}

impl CardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a new card created at `created_at`.
    ///
    /// The first review date is derived from the same timestamp that is
    /// written to `created_at`, so it is always the following calendar day.
    pub async fn insert(&self, card: &NewCard, created_at: DateTime<Utc>) -> Result<Card> {
        let next_review_date = scheduler::initial_review_date(created_at.date_naive());

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO cards (title, content, tags, next_review_date, code_snippet, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, created_at
            "#,
        )
        .bind(&card.title)
        .bind(&card.content)
        .bind(Json(&card.tags))
        .bind(next_review_date)
        .bind(card.code_snippet.as_ref().map(Json))
        .bind(&card.description)
        .bind(created_at.to_rfc3339_opts(SecondsFormat::Millis, true))
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(card_id = id, "inserted card");

        Ok(Card {
            id,
            created_at,
            title: card.title.clone(),
            tags: card.tags.clone(),
            content: card.content.clone(),
            next_review_date,
            code_snippet: card.code_snippet.clone(),
            description: card.description.clone(),
        })
    }

    pub async fn get(&self, id: i64) -> Result<Card> {
        if id < 1 {
            return Err(AppError::NotFound);
        }

        let row: Option<CardRow> =
            sqlx::query_as(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Card::from).ok_or(AppError::NotFound)
    }

    /// Overwrite every mutable column of an existing card.
    pub async fn update(&self, card: &Card) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE cards
            SET title = ?, content = ?, tags = ?, code_snippet = ?, next_review_date = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&card.title)
        .bind(&card.content)
        .bind(Json(&card.tags))
        .bind(card.code_snippet.as_ref().map(Json))
        .bind(card.next_review_date)
        .bind(&card.description)
        .bind(card.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if id < 1 {
            return Err(AppError::NotFound);
        }

        let result = sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// One page of cards matching the title words and containing every tag.
    ///
    /// The total comes from a window count in the same statement, so it always
    /// describes exactly the filtered set the page was cut from.
    pub async fn list(&self, search: &CardSearch) -> Result<(Vec<Card>, Metadata)> {
        let filters = &search.filters;
        let title_expr = title_match_expr(&search.title);

        let title_clause = if title_expr.is_some() {
            "id IN (SELECT rowid FROM cards_fts WHERE cards_fts MATCH ?1)"
        } else {
            "?1 = ''"
        };

        let query = format!(
            r#"
            SELECT COUNT(*) OVER() AS total_records, {CARD_COLUMNS}
            FROM cards
            WHERE {title_clause}
            AND NOT EXISTS (
                SELECT 1 FROM json_each(?2) AS wanted
                WHERE wanted.value NOT IN (SELECT value FROM json_each(cards.tags))
            )
            ORDER BY {column} {direction}, created_at DESC, id DESC
            LIMIT ?3 OFFSET ?4
            "#,
            column = filters.sort_column(),
            direction = filters.sort_direction(),
        );

        let rows: Vec<CardWithCount> = sqlx::query_as(&query)
            .bind(title_expr.unwrap_or_default())
            .bind(Json(&search.tags))
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(&self.pool)
            .await?;

        let total_records = rows.first().map(|r| r.total_records).unwrap_or(0);
        let cards = rows.into_iter().map(|r| Card::from(r.card)).collect();
        let metadata = Metadata::calculate(total_records, filters.page, filters.page_size);

        Ok((cards, metadata))
    }

    /// Cards scheduled on or before `today`, oldest review date first.
    pub async fn list_due(&self, today: NaiveDate) -> Result<Vec<Card>> {
        let rows: Vec<CardRow> = sqlx::query_as(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE next_review_date <= ? \
             ORDER BY next_review_date ASC, id ASC"
        ))
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Card::from).collect())
    }

    pub async fn get_random(&self) -> Result<Card> {
        let row: Option<CardRow> = sqlx::query_as(&format!(
            "SELECT {CARD_COLUMNS} FROM cards ORDER BY RANDOM() LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Card::from).ok_or(AppError::NotFound)
    }
}
