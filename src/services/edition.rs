//! Edition import: register a local PDF as a new edition.
//!
//! Import is idempotent by file hash: re-importing the same PDF returns
//! the already registered edition instead of creating a second row.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use chrono::{NaiveDate, Utc};
use regex::Regex;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::models::{Edition, EditionStatus, NewEdition};
use crate::repository::{Store, StoreError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of an import attempt.
#[derive(Debug)]
pub struct ImportOutcome {
    pub edition: Edition,
    /// True when the file hash matched an existing edition.
    pub already_imported: bool,
}

/// Registers local PDF files as editions.
pub struct EditionService {
    store: Arc<dyn Store>,
    config: Config,
}

impl EditionService {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self { store, config }
    }

    /// Import a PDF from a local path: hash, dedup, copy into the storage
    /// root, insert as `pending`.
    pub async fn import_local_file(&self, path: &Path) -> Result<ImportOutcome, ImportError> {
        if !path.exists() {
            return Err(ImportError::NotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let file_hash = hex::encode(Sha256::digest(&bytes));

        if let Some(existing) = self.store.find_edition_by_hash(&file_hash).await? {
            info!(
                edition_id = existing.id,
                filename = %existing.filename,
                "edition already imported"
            );
            return Ok(ImportOutcome {
                edition: existing,
                already_imported: true,
            });
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{file_hash}.pdf"));

        let publication_date =
            extract_date_from_filename(&filename).unwrap_or_else(|| Utc::now().date_naive());

        // Store a path relative to the storage root so it survives moves.
        let pdf_dir = self.config.storage_root.join("pdfs");
        std::fs::create_dir_all(&pdf_dir)?;
        std::fs::copy(path, pdf_dir.join(&filename))?;
        let file_path = format!("pdfs/{filename}");

        let edition = self
            .store
            .create_edition(&NewEdition {
                filename,
                file_path,
                file_hash,
                publication_date,
                newspaper_name: self.config.newspaper_name.clone(),
                status: EditionStatus::Pending,
            })
            .await?;

        info!(edition_id = edition.id, filename = %edition.filename, "edition imported");
        Ok(ImportOutcome {
            edition,
            already_imported: false,
        })
    }
}

/// Pull the publication date out of an `EH<YYYY-MM-DD>...` filename.
pub fn extract_date_from_filename(filename: &str) -> Option<NaiveDate> {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATE_RE.get_or_init(|| {
        Regex::new(r"EH(\d{4}-\d{2}-\d{2})").expect("valid filename date regex")
    });
    let captured = re.captures(filename)?.get(1)?.as_str();
    NaiveDate::parse_from_str(captured, "%Y-%m-%d").ok()
}
