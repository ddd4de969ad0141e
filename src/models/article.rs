//! Article and tag models.
//!
//! Articles are immutable once created and deduplicated by a SHA-256
//! content hash over title+body, which makes pipeline re-runs idempotent
//! at the article level.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Compute the article dedup key: sha256(title + body), hex-encoded.
pub fn content_hash_of(title: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

/// One extracted news story belonging to an edition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub edition_id: i64,
    pub title: String,
    pub body: String,
    /// First ≤500 characters of the body, for list views.
    pub body_excerpt: String,
    pub section: Option<String>,
    pub page_number: u32,
    pub publication_date: NaiveDate,
    pub newspaper_name: String,
    /// sha256(title+body); unique.
    pub content_hash: String,
    pub word_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create an article row.
#[derive(Debug, Clone, Serialize)]
pub struct NewArticle {
    pub edition_id: i64,
    pub title: String,
    pub body: String,
    pub body_excerpt: String,
    pub section: Option<String>,
    pub page_number: u32,
    pub publication_date: NaiveDate,
    pub newspaper_name: String,
    pub content_hash: String,
    pub word_count: u32,
}

/// A candidate article produced by either extraction path, before
/// persistence and deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleCandidate {
    pub title: String,
    pub body: String,
    pub body_excerpt: String,
    pub section: Option<String>,
    pub page_number: u32,
    pub word_count: u32,
    pub tags: Vec<TagCandidate>,
}

/// A scored tag suggestion for a candidate article.
#[derive(Debug, Clone, PartialEq)]
pub struct TagCandidate {
    /// Normalized name: lowercase, unaccented.
    pub name: String,
    /// Original (possibly accented) form found in the text.
    pub display_name: String,
    pub score: f64,
}

/// A keyword shared across articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    /// Advisory count of articles carrying this tag; incremented on
    /// attach, not guaranteed atomic across transports.
    pub article_count: u32,
}

/// Fields required to create a tag row.
#[derive(Debug, Clone, Serialize)]
pub struct NewTag {
    pub name: String,
    pub display_name: String,
    pub article_count: u32,
}
