//! Edition model: one digitized newspaper issue (one PDF).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::job::JobError;

/// Processing status of an edition. Transitions move forward only:
/// `pending → processing → completed | error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditionStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl EditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A digitized newspaper edition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edition {
    /// Database row ID.
    pub id: i64,
    /// Original filename of the uploaded/imported PDF.
    pub filename: String,
    /// Stored path, relative to a storage root or absolute.
    pub file_path: String,
    /// SHA-256 of the PDF bytes; unique, used for import dedup.
    pub file_hash: String,
    /// Date the issue was published.
    pub publication_date: NaiveDate,
    pub newspaper_name: String,
    /// Page count, known after the first extraction run.
    pub total_pages: Option<u32>,
    /// Count of articles persisted for this edition.
    pub total_articles: u32,
    pub status: EditionStatus,
    /// Summary of the last extraction run (see [`ProcessingLog`]).
    pub processing_log: Option<serde_json::Value>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create an edition row.
#[derive(Debug, Clone, Serialize)]
pub struct NewEdition {
    pub filename: String,
    pub file_path: String,
    pub file_hash: String,
    pub publication_date: NaiveDate,
    pub newspaper_name: String,
    pub status: EditionStatus,
}

/// Partial update for an edition row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EditionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EditionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_articles: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_log: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl EditionUpdate {
    /// Update that only moves the status.
    pub fn status(status: EditionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Summary of a completed or failed extraction run, stored on the edition
/// as JSON and read by admin list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingLog {
    pub pages_extracted: u32,
    pub articles_found: u32,
    pub articles_saved: u32,
    pub errors: Vec<JobError>,
    /// Which path produced the articles: "ai" or "heuristic".
    pub extraction_mode: String,
}
