//! PostgREST-backed store (Supabase).
//!
//! Filters use the `column=eq.value` query syntax, inserts ask for the
//! created row back with `Prefer: return=representation`, and counts use
//! HEAD requests with `Prefer: count=exact`, reading the total from the
//! `Content-Range` header. Row hydration is deliberately lenient: missing
//! or malformed fields fall back to defaults instead of failing the call.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{
    Article, Edition, EditionStatus, EditionUpdate, ExtractionJob, JobStatus, JobUpdate,
    NewArticle, NewEdition, NewJob, NewTag, Tag,
};

use super::{parse_datetime, parse_datetime_opt, Result, Store, StoreError};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// REST store speaking PostgREST against a Supabase project.
pub struct RestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    /// `base_url` is the project URL; the `/rest/v1` prefix is appended here.
    pub fn new(base_url: &str, service_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            service_key: service_key.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    async fn get_rows(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<Value>> {
        let resp = self
            .request(reqwest::Method::GET, table)
            .query(query)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Response(format!("HTTP {status}: {body}")));
        }

        let rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| StoreError::Response(e.to_string()))?;
        Ok(rows)
    }

    /// Insert one row and return its representation.
    async fn post_row<T: Serialize + Sync>(&self, table: &str, body: &T) -> Result<Value> {
        let resp = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StoreError::Response(format!("HTTP {status}: {text}")));
        }

        let mut rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| StoreError::Response(e.to_string()))?;
        if rows.is_empty() {
            return Err(StoreError::Response(
                "insert returned no representation".to_string(),
            ));
        }
        Ok(rows.remove(0))
    }

    async fn patch_rows<T: Serialize + Sync>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &T,
    ) -> Result<()> {
        let resp = self
            .request(reqwest::Method::PATCH, table)
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StoreError::Response(format!("HTTP {status}: {text}")));
        }
        Ok(())
    }

    async fn count_rows(&self, table: &str, query: &[(&str, String)]) -> Result<u32> {
        let resp = self
            .request(reqwest::Method::HEAD, table)
            .query(query)
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Response(format!("HTTP {status}")));
        }

        let range = resp
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        parse_content_range(range).ok_or_else(|| {
            StoreError::Response(format!("unparseable Content-Range header: {range:?}"))
        })
    }
}

/// Parse the total from a PostgREST `Content-Range` header.
/// Both `*/42` and `0-24/42` forms appear in the wild.
fn parse_content_range(value: &str) -> Option<u32> {
    let total = value.split('/').nth(1)?;
    total.trim().parse().ok()
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn opt_str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn i64_field(value: &Value, key: &str) -> i64 {
    value.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn u32_field(value: &Value, key: &str) -> u32 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0) as u32
}

fn opt_u32_field(value: &Value, key: &str) -> Option<u32> {
    value.get(key).and_then(Value::as_u64).map(|n| n as u32)
}

fn date_field(value: &Value, key: &str) -> NaiveDate {
    value
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or_default()
}

fn edition_from_value(value: &Value) -> Edition {
    Edition {
        id: i64_field(value, "id"),
        filename: str_field(value, "filename"),
        file_path: str_field(value, "file_path"),
        file_hash: str_field(value, "file_hash"),
        publication_date: date_field(value, "publication_date"),
        newspaper_name: str_field(value, "newspaper_name"),
        total_pages: opt_u32_field(value, "total_pages"),
        total_articles: u32_field(value, "total_articles"),
        status: EditionStatus::from_str(&str_field(value, "status"))
            .unwrap_or(EditionStatus::Pending),
        processing_log: value.get("processing_log").filter(|v| !v.is_null()).cloned(),
        processed_at: parse_datetime_opt(opt_str_field(value, "processed_at")),
        created_at: parse_datetime(&str_field(value, "created_at")),
        updated_at: parse_datetime(&str_field(value, "updated_at")),
    }
}

fn job_from_value(value: &Value) -> ExtractionJob {
    ExtractionJob {
        id: i64_field(value, "id"),
        edition_id: i64_field(value, "edition_id"),
        status: JobStatus::from_str(&str_field(value, "status")).unwrap_or(JobStatus::Queued),
        page_current: u32_field(value, "page_current"),
        page_total: opt_u32_field(value, "page_total"),
        articles_extracted: u32_field(value, "articles_extracted"),
        errors: value
            .get("errors")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default(),
        started_at: parse_datetime_opt(opt_str_field(value, "started_at")),
        finished_at: parse_datetime_opt(opt_str_field(value, "finished_at")),
        created_at: parse_datetime(&str_field(value, "created_at")),
    }
}

fn article_from_value(value: &Value) -> Article {
    Article {
        id: i64_field(value, "id"),
        edition_id: i64_field(value, "edition_id"),
        title: str_field(value, "title"),
        body: str_field(value, "body"),
        body_excerpt: str_field(value, "body_excerpt"),
        section: opt_str_field(value, "section"),
        page_number: u32_field(value, "page_number"),
        publication_date: date_field(value, "publication_date"),
        newspaper_name: str_field(value, "newspaper_name"),
        content_hash: str_field(value, "content_hash"),
        word_count: u32_field(value, "word_count"),
        created_at: parse_datetime(&str_field(value, "created_at")),
    }
}

fn tag_from_value(value: &Value) -> Tag {
    Tag {
        id: i64_field(value, "id"),
        name: str_field(value, "name"),
        display_name: str_field(value, "display_name"),
        article_count: u32_field(value, "article_count"),
    }
}

fn id_filter(id: i64) -> Vec<(&'static str, String)> {
    vec![("id", format!("eq.{id}"))]
}

#[async_trait]
impl Store for RestStore {
    async fn create_edition(&self, new: &NewEdition) -> Result<Edition> {
        let row = self.post_row("editions", new).await?;
        Ok(edition_from_value(&row))
    }

    async fn find_edition_by_hash(&self, file_hash: &str) -> Result<Option<Edition>> {
        let rows = self
            .get_rows("editions", &[("file_hash", format!("eq.{file_hash}"))])
            .await?;
        Ok(rows.first().map(edition_from_value))
    }

    async fn get_edition(&self, id: i64) -> Result<Edition> {
        let rows = self.get_rows("editions", &id_filter(id)).await?;
        rows.first()
            .map(edition_from_value)
            .ok_or(StoreError::NotFound {
                entity: "edition",
                id,
            })
    }

    async fn update_edition(&self, id: i64, update: &EditionUpdate) -> Result<()> {
        self.patch_rows("editions", &id_filter(id), update).await
    }

    async fn count_editions(&self) -> Result<u32> {
        self.count_rows("editions", &[]).await
    }

    async fn count_editions_with_status(&self, status: EditionStatus) -> Result<u32> {
        self.count_rows("editions", &[("status", format!("eq.{}", status.as_str()))])
            .await
    }

    async fn create_job(&self, new: &NewJob) -> Result<ExtractionJob> {
        let row = self.post_row("extraction_jobs", new).await?;
        Ok(job_from_value(&row))
    }

    async fn get_job(&self, id: i64) -> Result<ExtractionJob> {
        let rows = self.get_rows("extraction_jobs", &id_filter(id)).await?;
        rows.first().map(job_from_value).ok_or(StoreError::NotFound {
            entity: "extraction job",
            id,
        })
    }

    async fn update_job(&self, id: i64, update: &JobUpdate) -> Result<()> {
        self.patch_rows("extraction_jobs", &id_filter(id), update)
            .await
    }

    async fn latest_job_for_edition(&self, edition_id: i64) -> Result<Option<ExtractionJob>> {
        let rows = self
            .get_rows(
                "extraction_jobs",
                &[
                    ("edition_id", format!("eq.{edition_id}")),
                    ("order", "id.desc".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.first().map(job_from_value))
    }

    async fn article_exists(&self, content_hash: &str) -> Result<bool> {
        let count = self
            .count_rows("articles", &[("content_hash", format!("eq.{content_hash}"))])
            .await?;
        Ok(count > 0)
    }

    async fn create_article(&self, new: &NewArticle) -> Result<Article> {
        let row = self.post_row("articles", new).await?;
        Ok(article_from_value(&row))
    }

    async fn count_articles_for_edition(&self, edition_id: i64) -> Result<u32> {
        self.count_rows("articles", &[("edition_id", format!("eq.{edition_id}"))])
            .await
    }

    async fn count_articles(&self) -> Result<u32> {
        self.count_rows("articles", &[]).await
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let rows = self
            .get_rows("tags", &[("name", format!("eq.{name}"))])
            .await?;
        Ok(rows.first().map(tag_from_value))
    }

    async fn create_tag(&self, new: &NewTag) -> Result<Tag> {
        let row = self.post_row("tags", new).await?;
        Ok(tag_from_value(&row))
    }

    async fn attach_tag(&self, article_id: i64, tag_id: i64, score: f64) -> Result<()> {
        self.post_row(
            "article_tag",
            &json!({
                "article_id": article_id,
                "tag_id": tag_id,
                "score": score,
            }),
        )
        .await?;
        Ok(())
    }

    async fn increment_tag_count(&self, tag_id: i64) -> Result<()> {
        let rows = self.get_rows("tags", &id_filter(tag_id)).await?;
        let tag = rows.first().map(tag_from_value).ok_or(StoreError::NotFound {
            entity: "tag",
            id: tag_id,
        })?;
        self.patch_rows(
            "tags",
            &id_filter(tag_id),
            &json!({"article_count": tag.article_count + 1}),
        )
        .await
    }

    async fn count_tags(&self) -> Result<u32> {
        self.count_rows("tags", &[]).await
    }
}
