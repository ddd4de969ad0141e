//! Fallback combinator over two stores.
//!
//! Every operation runs against the primary store first. On any error the
//! failure is logged and the same call is replayed against the fallback
//! store when one is configured, so a broken local database degrades into
//! remote-only persistence instead of a failed run.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::models::{
    Article, Edition, EditionStatus, EditionUpdate, ExtractionJob, JobUpdate, NewArticle,
    NewEdition, NewJob, NewTag, Tag,
};

use super::{Result, Store};

/// A store that retries each failed operation against a secondary backend.
pub struct FallbackStore {
    primary: Arc<dyn Store>,
    fallback: Option<Arc<dyn Store>>,
}

impl FallbackStore {
    pub fn new(primary: Arc<dyn Store>, fallback: Option<Arc<dyn Store>>) -> Self {
        Self { primary, fallback }
    }
}

macro_rules! with_fallback {
    ($self:ident, $op:literal, $method:ident ( $($arg:expr),* )) => {{
        match $self.primary.$method($($arg),*).await {
            Ok(value) => Ok(value),
            Err(e) => match &$self.fallback {
                Some(fallback) => {
                    warn!(op = $op, error = %e, "primary store failed, retrying on fallback");
                    fallback.$method($($arg),*).await
                }
                None => Err(e),
            },
        }
    }};
}

#[async_trait]
impl Store for FallbackStore {
    async fn create_edition(&self, new: &NewEdition) -> Result<Edition> {
        with_fallback!(self, "create_edition", create_edition(new))
    }

    async fn find_edition_by_hash(&self, file_hash: &str) -> Result<Option<Edition>> {
        with_fallback!(self, "find_edition_by_hash", find_edition_by_hash(file_hash))
    }

    async fn get_edition(&self, id: i64) -> Result<Edition> {
        with_fallback!(self, "get_edition", get_edition(id))
    }

    async fn update_edition(&self, id: i64, update: &EditionUpdate) -> Result<()> {
        with_fallback!(self, "update_edition", update_edition(id, update))
    }

    async fn count_editions(&self) -> Result<u32> {
        with_fallback!(self, "count_editions", count_editions())
    }

    async fn count_editions_with_status(&self, status: EditionStatus) -> Result<u32> {
        with_fallback!(
            self,
            "count_editions_with_status",
            count_editions_with_status(status)
        )
    }

    async fn create_job(&self, new: &NewJob) -> Result<ExtractionJob> {
        with_fallback!(self, "create_job", create_job(new))
    }

    async fn get_job(&self, id: i64) -> Result<ExtractionJob> {
        with_fallback!(self, "get_job", get_job(id))
    }

    async fn update_job(&self, id: i64, update: &JobUpdate) -> Result<()> {
        with_fallback!(self, "update_job", update_job(id, update))
    }

    async fn latest_job_for_edition(&self, edition_id: i64) -> Result<Option<ExtractionJob>> {
        with_fallback!(
            self,
            "latest_job_for_edition",
            latest_job_for_edition(edition_id)
        )
    }

    async fn article_exists(&self, content_hash: &str) -> Result<bool> {
        with_fallback!(self, "article_exists", article_exists(content_hash))
    }

    async fn create_article(&self, new: &NewArticle) -> Result<Article> {
        with_fallback!(self, "create_article", create_article(new))
    }

    async fn count_articles_for_edition(&self, edition_id: i64) -> Result<u32> {
        with_fallback!(
            self,
            "count_articles_for_edition",
            count_articles_for_edition(edition_id)
        )
    }

    async fn count_articles(&self) -> Result<u32> {
        with_fallback!(self, "count_articles", count_articles())
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        with_fallback!(self, "find_tag_by_name", find_tag_by_name(name))
    }

    async fn create_tag(&self, new: &NewTag) -> Result<Tag> {
        with_fallback!(self, "create_tag", create_tag(new))
    }

    async fn attach_tag(&self, article_id: i64, tag_id: i64, score: f64) -> Result<()> {
        with_fallback!(self, "attach_tag", attach_tag(article_id, tag_id, score))
    }

    async fn increment_tag_count(&self, tag_id: i64) -> Result<()> {
        with_fallback!(self, "increment_tag_count", increment_tag_count(tag_id))
    }

    async fn count_tags(&self) -> Result<u32> {
        with_fallback!(self, "count_tags", count_tags())
    }
}
