//! Extraction job model: progress tracking for one pipeline run.
//!
//! Jobs are append-only history: every run creates a new row, including
//! retries of the same edition. External pollers read the latest job for
//! an edition as a JSON status document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a single extraction run.
/// `queued → running → completed | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One recorded error during a run. Candidate-level errors carry the page
/// and title; run-level failures carry only the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub error: String,
}

impl JobError {
    /// Error tied to a specific candidate article.
    pub fn for_article(page: u32, title: &str, error: impl ToString) -> Self {
        Self {
            page: Some(page),
            title: Some(title.to_string()),
            error: error.to_string(),
        }
    }

    /// Run-level error with no article context.
    pub fn run_level(error: impl ToString) -> Self {
        Self {
            page: None,
            title: None,
            error: error.to_string(),
        }
    }
}

/// A single extraction run over one edition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionJob {
    pub id: i64,
    pub edition_id: i64,
    pub status: JobStatus,
    /// Page number of the most recently persisted article.
    pub page_current: u32,
    /// Total pages in the document, once extraction has counted them.
    pub page_total: Option<u32>,
    pub articles_extracted: u32,
    pub errors: Vec<JobError>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a job row.
#[derive(Debug, Clone, Serialize)]
pub struct NewJob {
    pub edition_id: i64,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
}

/// Partial update for a job row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_current: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles_extracted: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<JobError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// JSON status document served to external pollers.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusDoc {
    pub status: JobStatus,
    pub page_current: u32,
    pub page_total: Option<u32>,
    pub articles_extracted: u32,
    pub errors: Vec<JobError>,
}

impl From<&ExtractionJob> for JobStatusDoc {
    fn from(job: &ExtractionJob) -> Self {
        Self {
            status: job.status,
            page_current: job.page_current,
            page_total: job.page_total,
            articles_extracted: job.articles_extracted,
            errors: job.errors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_job_error_serialization_skips_missing_context() {
        let run = JobError::run_level("boom");
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom"}));

        let article = JobError::for_article(3, "TITULAR", "falló");
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"page": 3, "title": "TITULAR", "error": "falló"})
        );
    }

    #[test]
    fn test_status_doc_from_job() {
        let job = ExtractionJob {
            id: 1,
            edition_id: 7,
            status: JobStatus::Running,
            page_current: 4,
            page_total: Some(12),
            articles_extracted: 9,
            errors: vec![],
            started_at: Some(Utc::now()),
            finished_at: None,
            created_at: Utc::now(),
        };
        let doc = JobStatusDoc::from(&job);
        assert_eq!(doc.page_current, 4);
        assert_eq!(doc.page_total, Some(12));
        assert_eq!(doc.articles_extracted, 9);
    }
}
