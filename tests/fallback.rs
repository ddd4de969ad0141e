//! Transport-failure scenario: the primary store errors on every call and
//! the REST-style fallback (stood in by a second SQLite store) takes over,
//! so the run still reaches `completed`.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use hemeroteca::config::Config;
use hemeroteca::models::{
    Article, Edition, EditionStatus, EditionUpdate, ExtractionJob, JobStatus, JobUpdate,
    NewArticle, NewEdition, NewJob, NewTag, Tag,
};
use hemeroteca::repository::{FallbackStore, Result, SqliteStore, Store, StoreError};
use hemeroteca::services::{EditionService, ExtractionPipeline};

struct FailingStore;

fn fail<T>() -> Result<T> {
    Err(StoreError::Transport("connection refused".to_string()))
}

#[async_trait]
impl Store for FailingStore {
    async fn create_edition(&self, _new: &NewEdition) -> Result<Edition> {
        fail()
    }
    async fn find_edition_by_hash(&self, _file_hash: &str) -> Result<Option<Edition>> {
        fail()
    }
    async fn get_edition(&self, _id: i64) -> Result<Edition> {
        fail()
    }
    async fn update_edition(&self, _id: i64, _update: &EditionUpdate) -> Result<()> {
        fail()
    }
    async fn count_editions(&self) -> Result<u32> {
        fail()
    }
    async fn count_editions_with_status(&self, _status: EditionStatus) -> Result<u32> {
        fail()
    }
    async fn create_job(&self, _new: &NewJob) -> Result<ExtractionJob> {
        fail()
    }
    async fn get_job(&self, _id: i64) -> Result<ExtractionJob> {
        fail()
    }
    async fn update_job(&self, _id: i64, _update: &JobUpdate) -> Result<()> {
        fail()
    }
    async fn latest_job_for_edition(&self, _edition_id: i64) -> Result<Option<ExtractionJob>> {
        fail()
    }
    async fn article_exists(&self, _content_hash: &str) -> Result<bool> {
        fail()
    }
    async fn create_article(&self, _new: &NewArticle) -> Result<Article> {
        fail()
    }
    async fn count_articles_for_edition(&self, _edition_id: i64) -> Result<u32> {
        fail()
    }
    async fn count_articles(&self) -> Result<u32> {
        fail()
    }
    async fn find_tag_by_name(&self, _name: &str) -> Result<Option<Tag>> {
        fail()
    }
    async fn create_tag(&self, _new: &NewTag) -> Result<Tag> {
        fail()
    }
    async fn attach_tag(&self, _article_id: i64, _tag_id: i64, _score: f64) -> Result<()> {
        fail()
    }
    async fn increment_tag_count(&self, _tag_id: i64) -> Result<()> {
        fail()
    }
    async fn count_tags(&self) -> Result<u32> {
        fail()
    }
}

#[tokio::test]
async fn test_run_completes_through_fallback_transport() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        database_path: dir.path().join("unused.db"),
        anthropic_api_key: None,
        supabase_url: None,
        supabase_service_key: None,
        storage_root: dir.path().join("storage"),
        runtime_root: dir.path().join("runtime"),
        newspaper_name: "El Heraldo".to_string(),
    };

    let secondary = Arc::new(SqliteStore::new(&dir.path().join("fallback.db")).unwrap());
    let store: Arc<dyn Store> = Arc::new(FallbackStore::new(
        Arc::new(FailingStore),
        Some(secondary.clone()),
    ));

    let pdf_path = dir.path().join("EH2026-02-19.pdf");
    let pages = common::sample_edition_pages();
    let page_refs: Vec<&[&str]> = pages.iter().map(|p| p.as_slice()).collect();
    common::write_test_pdf(&pdf_path, &page_refs);

    let service = EditionService::new(store.clone(), config.clone());
    let edition_id = service
        .import_local_file(&pdf_path)
        .await
        .unwrap()
        .edition
        .id;

    let pipeline = ExtractionPipeline::new(store.clone(), config);
    let summary = pipeline.run(edition_id).await.unwrap();
    assert_eq!(summary.articles_saved, 2);

    // Everything landed on the fallback backend and is retrievable there.
    let edition = secondary.get_edition(edition_id).await.unwrap();
    assert_eq!(edition.status, EditionStatus::Completed);
    assert_eq!(edition.total_articles, 2);
    assert_eq!(
        secondary
            .count_articles_for_edition(edition_id)
            .await
            .unwrap(),
        2
    );

    let job = secondary
        .latest_job_for_edition(edition_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.articles_extracted, 2);
}
