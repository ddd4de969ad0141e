//! Persistence layer: local SQLite plus an optional REST mirror.
//!
//! All pipeline writes go through the [`Store`] trait so the orchestrator
//! never cares which transport is underneath. [`FallbackStore`] wraps a
//! primary store and retries each failed operation against a secondary
//! one, which keeps a run alive when the local database is unavailable.

pub mod fallback;
pub mod rest;
pub mod sqlite;

pub use fallback::FallbackStore;
pub use rest::RestStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    Article, Edition, EditionStatus, EditionUpdate, ExtractionJob, JobUpdate, NewArticle,
    NewEdition, NewJob, NewTag, Tag,
};

/// Errors from any store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Response(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

/// The persistence contract shared by every backend.
///
/// Methods take references so a failed call can be replayed verbatim
/// against another backend.
#[async_trait]
pub trait Store: Send + Sync {
    // Editions
    async fn create_edition(&self, new: &NewEdition) -> Result<Edition>;
    async fn find_edition_by_hash(&self, file_hash: &str) -> Result<Option<Edition>>;
    async fn get_edition(&self, id: i64) -> Result<Edition>;
    async fn update_edition(&self, id: i64, update: &EditionUpdate) -> Result<()>;
    async fn count_editions(&self) -> Result<u32>;
    async fn count_editions_with_status(&self, status: EditionStatus) -> Result<u32>;

    // Extraction jobs
    async fn create_job(&self, new: &NewJob) -> Result<ExtractionJob>;
    async fn get_job(&self, id: i64) -> Result<ExtractionJob>;
    async fn update_job(&self, id: i64, update: &JobUpdate) -> Result<()>;
    async fn latest_job_for_edition(&self, edition_id: i64) -> Result<Option<ExtractionJob>>;

    // Articles
    async fn article_exists(&self, content_hash: &str) -> Result<bool>;
    async fn create_article(&self, new: &NewArticle) -> Result<Article>;
    async fn count_articles_for_edition(&self, edition_id: i64) -> Result<u32>;
    async fn count_articles(&self) -> Result<u32>;

    // Tags
    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>>;
    async fn create_tag(&self, new: &NewTag) -> Result<Tag>;
    async fn attach_tag(&self, article_id: i64, tag_id: i64, score: f64) -> Result<()>;
    async fn increment_tag_count(&self, tag_id: i64) -> Result<()>;
    async fn count_tags(&self) -> Result<u32>;
}
