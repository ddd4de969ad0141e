//! Domain models for editions, extraction jobs, articles and tags.

mod article;
mod edition;
mod job;

pub use article::{
    content_hash_of, Article, ArticleCandidate, NewArticle, NewTag, Tag, TagCandidate,
};
pub use edition::{Edition, EditionStatus, EditionUpdate, NewEdition, ProcessingLog};
pub use job::{ExtractionJob, JobError, JobStatus, JobStatusDoc, JobUpdate, NewJob};
