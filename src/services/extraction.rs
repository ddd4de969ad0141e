//! Extraction pipeline: the state machine that turns one edition PDF into
//! persisted articles.
//!
//! A run moves the edition `pending → processing → completed | error` and
//! records a matching extraction job `running → completed | failed`. The
//! two entities are updated in lockstep because external consumers read
//! them independently (pollers read the job, list views the edition).
//!
//! Failure policy: job-row creation failure is logged and swallowed
//! (progress updates become no-ops); terminal bookkeeping failures are
//! logged, not raised; everything else marks both entities failed and
//! re-raises to the caller.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::llm::{AiExtractor, ClaudeClient, ClaudeConfig};
use crate::models::{
    content_hash_of, ArticleCandidate, Edition, EditionStatus, EditionUpdate, JobError, JobStatus,
    JobUpdate, NewArticle, NewJob, NewTag, ProcessingLog,
};
use crate::pdf::{PdfError, PdfExtractor};
use crate::repository::{Store, StoreError};
use crate::segmenter::HeuristicSegmenter;
use crate::tags::{TagGenerator, DEFAULT_TAG_LIMIT};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not resolve edition file path: {0}")]
    Resolution(String),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one completed run did, for CLI reporting.
#[derive(Debug)]
pub struct RunSummary {
    pub edition_id: i64,
    pub job_id: Option<i64>,
    pub pages_extracted: u32,
    pub articles_found: u32,
    pub articles_saved: u32,
    /// "ai" or "heuristic".
    pub extraction_mode: String,
    pub errors: Vec<JobError>,
}

/// Orchestrates extraction for one edition at a time.
pub struct ExtractionPipeline {
    store: Arc<dyn Store>,
    config: Config,
    pdf: PdfExtractor,
    segmenter: HeuristicSegmenter,
    tagger: TagGenerator,
    ai: Option<AiExtractor>,
}

impl ExtractionPipeline {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let ai = config
            .anthropic_api_key
            .as_deref()
            .map(|key| AiExtractor::new(ClaudeClient::new(ClaudeConfig::new(key))));

        Self {
            store,
            config,
            pdf: PdfExtractor::new(),
            segmenter: HeuristicSegmenter::new(),
            tagger: TagGenerator::new(),
            ai,
        }
    }

    /// Run the full pipeline for one edition.
    pub async fn run(&self, edition_id: i64) -> Result<RunSummary, PipelineError> {
        let edition = self.store.get_edition(edition_id).await?;

        // Progress tracking is best-effort: a run without a job row still
        // extracts and persists articles.
        let job_id = match self
            .store
            .create_job(&NewJob {
                edition_id: edition.id,
                status: JobStatus::Running,
                started_at: Utc::now(),
            })
            .await
        {
            Ok(job) => Some(job.id),
            Err(e) => {
                warn!(edition_id = edition.id, error = %e, "could not create extraction job row");
                None
            }
        };

        match self.execute(&edition, job_id).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                self.record_failure(&edition, job_id, &e).await;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        edition: &Edition,
        job_id: Option<i64>,
    ) -> Result<RunSummary, PipelineError> {
        self.store
            .update_edition(edition.id, &EditionUpdate::status(EditionStatus::Processing))
            .await?;

        let path = self
            .config
            .resolve_file_path(&edition.file_path)
            .ok_or_else(|| PipelineError::Resolution(edition.file_path.clone()))?;

        let pages = self.pdf.extract_pages(&path)?;
        let page_total = pages.len() as u32;
        let mut errors: Vec<JobError> = pages
            .iter()
            .filter_map(|p| {
                p.error.as_ref().map(|e| JobError {
                    page: Some(p.page_number),
                    title: None,
                    error: e.clone(),
                })
            })
            .collect();

        self.update_job(
            job_id,
            &JobUpdate {
                page_total: Some(page_total),
                ..JobUpdate::default()
            },
        )
        .await;

        let (candidates, extraction_mode) = self.extract_candidates(edition, &pages).await;
        info!(
            edition_id = edition.id,
            mode = extraction_mode,
            candidates = candidates.len(),
            "extraction finished"
        );

        let articles_found = candidates.len() as u32;
        let mut articles_saved = 0u32;

        for candidate in &candidates {
            match self.persist_candidate(edition, candidate).await {
                Ok(true) => {
                    articles_saved += 1;
                    // This is the progress signal external pollers read.
                    self.update_job(
                        job_id,
                        &JobUpdate {
                            page_current: Some(candidate.page_number),
                            articles_extracted: Some(articles_saved),
                            ..JobUpdate::default()
                        },
                    )
                    .await;
                }
                Ok(false) => {
                    debug!(title = %candidate.title, "duplicate article skipped");
                }
                Err(e) => {
                    warn!(
                        page = candidate.page_number,
                        title = %candidate.title,
                        error = %e,
                        "failed to persist article"
                    );
                    errors.push(JobError::for_article(
                        candidate.page_number,
                        &candidate.title,
                        e,
                    ));
                }
            }
        }

        let total_articles = self
            .store
            .count_articles_for_edition(edition.id)
            .await
            .unwrap_or(articles_saved);

        let processing_log = ProcessingLog {
            pages_extracted: page_total,
            articles_found,
            articles_saved,
            errors: errors.clone(),
            extraction_mode: extraction_mode.to_string(),
        };

        // Terminal bookkeeping failures are logged, not raised: the work
        // itself already happened.
        let completion = EditionUpdate {
            status: Some(EditionStatus::Completed),
            total_pages: Some(page_total),
            total_articles: Some(total_articles),
            processing_log: serde_json::to_value(&processing_log).ok(),
            processed_at: Some(Utc::now()),
        };
        if let Err(e) = self.store.update_edition(edition.id, &completion).await {
            warn!(edition_id = edition.id, error = %e, "failed to record edition completion");
        }
        self.update_job(
            job_id,
            &JobUpdate {
                status: Some(JobStatus::Completed),
                page_current: Some(page_total),
                articles_extracted: Some(articles_saved),
                errors: Some(errors.clone()),
                finished_at: Some(Utc::now()),
                ..JobUpdate::default()
            },
        )
        .await;

        Ok(RunSummary {
            edition_id: edition.id,
            job_id,
            pages_extracted: page_total,
            articles_found,
            articles_saved,
            extraction_mode: extraction_mode.to_string(),
            errors,
        })
    }

    /// AI path first when configured; heuristics when it is absent or
    /// yields nothing.
    async fn extract_candidates(
        &self,
        edition: &Edition,
        pages: &[crate::pdf::PageText],
    ) -> (Vec<ArticleCandidate>, &'static str) {
        if let Some(ai) = &self.ai {
            let candidates = ai
                .extract_articles(pages, edition.publication_date, &edition.newspaper_name)
                .await;
            if !candidates.is_empty() {
                return (candidates, "ai");
            }
            info!(
                edition_id = edition.id,
                "ai extraction yielded no articles, falling back to heuristics"
            );
        }

        let mut candidates = self.segmenter.segment(pages);
        for candidate in &mut candidates {
            candidate.tags = self.tagger.generate(&candidate.body, DEFAULT_TAG_LIMIT);
        }
        (candidates, "heuristic")
    }

    /// Persist one candidate. Returns false when its content hash already
    /// exists (re-run idempotence at the article level).
    async fn persist_candidate(
        &self,
        edition: &Edition,
        candidate: &ArticleCandidate,
    ) -> Result<bool, StoreError> {
        let content_hash = content_hash_of(&candidate.title, &candidate.body);
        if self.store.article_exists(&content_hash).await? {
            return Ok(false);
        }

        let article = self
            .store
            .create_article(&NewArticle {
                edition_id: edition.id,
                title: candidate.title.clone(),
                body: candidate.body.clone(),
                body_excerpt: candidate.body_excerpt.clone(),
                section: candidate.section.clone(),
                page_number: candidate.page_number,
                publication_date: edition.publication_date,
                newspaper_name: edition.newspaper_name.clone(),
                content_hash,
                word_count: candidate.word_count,
            })
            .await?;

        for tag in &candidate.tags {
            let stored = match self.store.find_tag_by_name(&tag.name).await? {
                Some(existing) => existing,
                None => {
                    self.store
                        .create_tag(&NewTag {
                            name: tag.name.clone(),
                            display_name: tag.display_name.clone(),
                            article_count: 0,
                        })
                        .await?
                }
            };
            self.store.attach_tag(article.id, stored.id, tag.score).await?;
            self.store.increment_tag_count(stored.id).await?;
        }

        Ok(true)
    }

    /// Mark both entities failed. Transport failures here are logged only;
    /// the original error is what gets re-raised.
    async fn record_failure(&self, edition: &Edition, job_id: Option<i64>, error: &PipelineError) {
        let message = error.to_string();
        let failure = EditionUpdate {
            status: Some(EditionStatus::Error),
            processing_log: Some(json!({ "error": message })),
            processed_at: Some(Utc::now()),
            ..EditionUpdate::default()
        };
        if let Err(e) = self.store.update_edition(edition.id, &failure).await {
            warn!(edition_id = edition.id, error = %e, "failed to record edition failure");
        }
        self.update_job(
            job_id,
            &JobUpdate {
                status: Some(JobStatus::Failed),
                errors: Some(vec![JobError::run_level(&message)]),
                finished_at: Some(Utc::now()),
                ..JobUpdate::default()
            },
        )
        .await;
    }

    /// Progress updates are best-effort; without a job row they are no-ops.
    async fn update_job(&self, job_id: Option<i64>, update: &JobUpdate) {
        let Some(id) = job_id else {
            return;
        };
        if let Err(e) = self.store.update_job(id, update).await {
            warn!(job_id = id, error = %e, "failed to update extraction job");
        }
    }
}
