//! SQLite-backed store. The default, zero-setup backend.
//!
//! Connections are opened per call against a stored path, which keeps the
//! struct `Send + Sync` without a pool. Schema is created on construction.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, Row, ToSql};

use crate::models::{
    Article, Edition, EditionStatus, EditionUpdate, ExtractionJob, JobStatus, JobUpdate,
    NewArticle, NewEdition, NewJob, NewTag, Tag,
};

use super::{parse_datetime, parse_datetime_opt, Result, Store, StoreError};

/// SQLite store rooted at a database file path.
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path` and ensure the
    /// schema exists.
    pub fn new(db_path: &Path) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS editions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_hash TEXT NOT NULL UNIQUE,
                publication_date TEXT NOT NULL,
                newspaper_name TEXT NOT NULL,
                total_pages INTEGER,
                total_articles INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'pending',
                processing_log TEXT,
                processed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS extraction_jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                edition_id INTEGER NOT NULL REFERENCES editions(id) ON DELETE CASCADE,
                status TEXT NOT NULL DEFAULT 'queued',
                page_current INTEGER NOT NULL DEFAULT 0,
                page_total INTEGER,
                articles_extracted INTEGER NOT NULL DEFAULT 0,
                errors TEXT NOT NULL DEFAULT '[]',
                started_at TEXT,
                finished_at TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_jobs_edition
                ON extraction_jobs(edition_id, id DESC);

            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                edition_id INTEGER NOT NULL REFERENCES editions(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                body_excerpt TEXT NOT NULL,
                section TEXT,
                page_number INTEGER NOT NULL,
                publication_date TEXT NOT NULL,
                newspaper_name TEXT NOT NULL,
                content_hash TEXT NOT NULL UNIQUE,
                word_count INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_articles_edition
                ON articles(edition_id);

            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL,
                article_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS article_tag (
                article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                score REAL NOT NULL DEFAULT 0,
                PRIMARY KEY (article_id, tag_id)
            );
        "#,
        )?;
        Ok(())
    }
}

fn edition_from_row(row: &Row<'_>) -> rusqlite::Result<Edition> {
    let date: String = row.get("publication_date")?;
    let status: String = row.get("status")?;
    let log: Option<String> = row.get("processing_log")?;
    Ok(Edition {
        id: row.get("id")?,
        filename: row.get("filename")?,
        file_path: row.get("file_path")?,
        file_hash: row.get("file_hash")?,
        publication_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
        newspaper_name: row.get("newspaper_name")?,
        total_pages: row.get("total_pages")?,
        total_articles: row.get("total_articles")?,
        status: EditionStatus::from_str(&status).unwrap_or(EditionStatus::Pending),
        processing_log: log.and_then(|s| serde_json::from_str(&s).ok()),
        processed_at: parse_datetime_opt(row.get("processed_at")?),
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(&row.get::<_, String>("updated_at")?),
    })
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<ExtractionJob> {
    let status: String = row.get("status")?;
    let errors: String = row.get("errors")?;
    Ok(ExtractionJob {
        id: row.get("id")?,
        edition_id: row.get("edition_id")?,
        status: JobStatus::from_str(&status).unwrap_or(JobStatus::Queued),
        page_current: row.get("page_current")?,
        page_total: row.get("page_total")?,
        articles_extracted: row.get("articles_extracted")?,
        errors: serde_json::from_str(&errors).unwrap_or_default(),
        started_at: parse_datetime_opt(row.get("started_at")?),
        finished_at: parse_datetime_opt(row.get("finished_at")?),
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    let date: String = row.get("publication_date")?;
    Ok(Article {
        id: row.get("id")?,
        edition_id: row.get("edition_id")?,
        title: row.get("title")?,
        body: row.get("body")?,
        body_excerpt: row.get("body_excerpt")?,
        section: row.get("section")?,
        page_number: row.get("page_number")?,
        publication_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
        newspaper_name: row.get("newspaper_name")?,
        content_hash: row.get("content_hash")?,
        word_count: row.get("word_count")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get("id")?,
        name: row.get("name")?,
        display_name: row.get("display_name")?,
        article_count: row.get("article_count")?,
    })
}

const EDITION_COLUMNS: &str = "id, filename, file_path, file_hash, publication_date, \
     newspaper_name, total_pages, total_articles, status, processing_log, \
     processed_at, created_at, updated_at";

const JOB_COLUMNS: &str = "id, edition_id, status, page_current, page_total, \
     articles_extracted, errors, started_at, finished_at, created_at";

const ARTICLE_COLUMNS: &str = "id, edition_id, title, body, body_excerpt, section, \
     page_number, publication_date, newspaper_name, content_hash, word_count, created_at";

#[async_trait]
impl Store for SqliteStore {
    async fn create_edition(&self, new: &NewEdition) -> Result<Edition> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            r#"
            INSERT INTO editions
                (filename, file_path, file_hash, publication_date, newspaper_name,
                 status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            params![
                new.filename,
                new.file_path,
                new.file_hash,
                new.publication_date.format("%Y-%m-%d").to_string(),
                new.newspaper_name,
                new.status.as_str(),
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {EDITION_COLUMNS} FROM editions WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], edition_from_row)?)
    }

    async fn find_edition_by_hash(&self, file_hash: &str) -> Result<Option<Edition>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {EDITION_COLUMNS} FROM editions WHERE file_hash = ?1");
        match conn.query_row(&sql, params![file_hash], edition_from_row) {
            Ok(edition) => Ok(Some(edition)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_edition(&self, id: i64) -> Result<Edition> {
        let conn = self.connect()?;
        let sql = format!("SELECT {EDITION_COLUMNS} FROM editions WHERE id = ?1");
        match conn.query_row(&sql, params![id], edition_from_row) {
            Ok(edition) => Ok(edition),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound {
                entity: "edition",
                id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_edition(&self, id: i64, update: &EditionUpdate) -> Result<()> {
        let conn = self.connect()?;
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = update.status {
            sets.push("status = ?");
            values.push(Box::new(status.as_str()));
        }
        if let Some(total_pages) = update.total_pages {
            sets.push("total_pages = ?");
            values.push(Box::new(total_pages));
        }
        if let Some(total_articles) = update.total_articles {
            sets.push("total_articles = ?");
            values.push(Box::new(total_articles));
        }
        if let Some(log) = &update.processing_log {
            sets.push("processing_log = ?");
            values.push(Box::new(log.to_string()));
        }
        if let Some(processed_at) = update.processed_at {
            sets.push("processed_at = ?");
            values.push(Box::new(processed_at.to_rfc3339()));
        }
        sets.push("updated_at = ?");
        values.push(Box::new(Utc::now().to_rfc3339()));
        values.push(Box::new(id));

        let sql = format!("UPDATE editions SET {} WHERE id = ?", sets.join(", "));
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        conn.execute(&sql, refs.as_slice())?;
        Ok(())
    }

    async fn count_editions(&self) -> Result<u32> {
        let conn = self.connect()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM editions", [], |row| row.get(0))?)
    }

    async fn count_editions_with_status(&self, status: EditionStatus) -> Result<u32> {
        let conn = self.connect()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM editions WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?)
    }

    async fn create_job(&self, new: &NewJob) -> Result<ExtractionJob> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            r#"
            INSERT INTO extraction_jobs (edition_id, status, started_at, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                new.edition_id,
                new.status.as_str(),
                new.started_at.to_rfc3339(),
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {JOB_COLUMNS} FROM extraction_jobs WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], job_from_row)?)
    }

    async fn get_job(&self, id: i64) -> Result<ExtractionJob> {
        let conn = self.connect()?;
        let sql = format!("SELECT {JOB_COLUMNS} FROM extraction_jobs WHERE id = ?1");
        match conn.query_row(&sql, params![id], job_from_row) {
            Ok(job) => Ok(job),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound {
                entity: "extraction job",
                id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_job(&self, id: i64, update: &JobUpdate) -> Result<()> {
        let conn = self.connect()?;
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = update.status {
            sets.push("status = ?");
            values.push(Box::new(status.as_str()));
        }
        if let Some(page_current) = update.page_current {
            sets.push("page_current = ?");
            values.push(Box::new(page_current));
        }
        if let Some(page_total) = update.page_total {
            sets.push("page_total = ?");
            values.push(Box::new(page_total));
        }
        if let Some(articles_extracted) = update.articles_extracted {
            sets.push("articles_extracted = ?");
            values.push(Box::new(articles_extracted));
        }
        if let Some(errors) = &update.errors {
            sets.push("errors = ?");
            values.push(Box::new(
                serde_json::to_string(errors).unwrap_or_else(|_| "[]".to_string()),
            ));
        }
        if let Some(finished_at) = update.finished_at {
            sets.push("finished_at = ?");
            values.push(Box::new(finished_at.to_rfc3339()));
        }

        if sets.is_empty() {
            return Ok(());
        }
        values.push(Box::new(id));

        let sql = format!("UPDATE extraction_jobs SET {} WHERE id = ?", sets.join(", "));
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        conn.execute(&sql, refs.as_slice())?;
        Ok(())
    }

    async fn latest_job_for_edition(&self, edition_id: i64) -> Result<Option<ExtractionJob>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM extraction_jobs WHERE edition_id = ?1 \
             ORDER BY id DESC LIMIT 1"
        );
        match conn.query_row(&sql, params![edition_id], job_from_row) {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn article_exists(&self, content_hash: &str) -> Result<bool> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE content_hash = ?1",
            params![content_hash],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    async fn create_article(&self, new: &NewArticle) -> Result<Article> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            r#"
            INSERT INTO articles
                (edition_id, title, body, body_excerpt, section, page_number,
                 publication_date, newspaper_name, content_hash, word_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                new.edition_id,
                new.title,
                new.body,
                new.body_excerpt,
                new.section,
                new.page_number,
                new.publication_date.format("%Y-%m-%d").to_string(),
                new.newspaper_name,
                new.content_hash,
                new.word_count,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], article_from_row)?)
    }

    async fn count_articles_for_edition(&self, edition_id: i64) -> Result<u32> {
        let conn = self.connect()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE edition_id = ?1",
            params![edition_id],
            |row| row.get(0),
        )?)
    }

    async fn count_articles(&self) -> Result<u32> {
        let conn = self.connect()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?)
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let conn = self.connect()?;
        match conn.query_row(
            "SELECT id, name, display_name, article_count FROM tags WHERE name = ?1",
            params![name],
            tag_from_row,
        ) {
            Ok(tag) => Ok(Some(tag)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_tag(&self, new: &NewTag) -> Result<Tag> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO tags (name, display_name, article_count) VALUES (?1, ?2, ?3)",
            params![new.name, new.display_name, new.article_count],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
            "SELECT id, name, display_name, article_count FROM tags WHERE id = ?1",
            params![id],
            tag_from_row,
        )?)
    }

    async fn attach_tag(&self, article_id: i64, tag_id: i64, score: f64) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO article_tag (article_id, tag_id, score)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (article_id, tag_id) DO UPDATE SET score = excluded.score
            "#,
            params![article_id, tag_id, score],
        )?;
        Ok(())
    }

    async fn increment_tag_count(&self, tag_id: i64) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "UPDATE tags SET article_count = article_count + 1 WHERE id = ?1",
            params![tag_id],
        )?;
        Ok(())
    }

    async fn count_tags(&self) -> Result<u32> {
        let conn = self.connect()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content_hash_of;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn new_edition(hash: &str) -> NewEdition {
        NewEdition {
            filename: format!("EH2026-02-19-{hash}.pdf"),
            file_path: format!("pdfs/EH2026-02-19-{hash}.pdf"),
            file_hash: hash.to_string(),
            publication_date: NaiveDate::from_ymd_opt(2026, 2, 19).unwrap(),
            newspaper_name: "El Heraldo".to_string(),
            status: EditionStatus::Pending,
        }
    }

    fn new_article(edition_id: i64, title: &str) -> NewArticle {
        let body = "Cuerpo del artículo de prueba con suficiente texto.".to_string();
        NewArticle {
            edition_id,
            title: title.to_string(),
            body_excerpt: body.clone(),
            content_hash: content_hash_of(title, &body),
            body,
            section: Some("Deportes".to_string()),
            page_number: 3,
            publication_date: NaiveDate::from_ymd_opt(2026, 2, 19).unwrap(),
            newspaper_name: "El Heraldo".to_string(),
            word_count: 8,
        }
    }

    #[tokio::test]
    async fn test_edition_create_and_find_by_hash() {
        let (_dir, store) = store();
        let created = store.create_edition(&new_edition("abc123")).await.unwrap();
        assert_eq!(created.status, EditionStatus::Pending);
        assert_eq!(created.total_articles, 0);
        assert_eq!(created.total_pages, None);

        let found = store.find_edition_by_hash("abc123").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(
            found.publication_date,
            NaiveDate::from_ymd_opt(2026, 2, 19).unwrap()
        );
        assert!(store.find_edition_by_hash("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_file_hash_rejected() {
        let (_dir, store) = store();
        store.create_edition(&new_edition("dup")).await.unwrap();
        assert!(store.create_edition(&new_edition("dup")).await.is_err());
    }

    #[tokio::test]
    async fn test_get_edition_not_found() {
        let (_dir, store) = store();
        let err = store.get_edition(42).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                entity: "edition",
                id: 42
            }
        ));
    }

    #[tokio::test]
    async fn test_update_edition_partial() {
        let (_dir, store) = store();
        let edition = store.create_edition(&new_edition("upd")).await.unwrap();

        let update = EditionUpdate {
            status: Some(EditionStatus::Completed),
            total_pages: Some(12),
            total_articles: Some(5),
            processing_log: Some(json!({"extraction_mode": "heuristic"})),
            processed_at: Some(Utc::now()),
        };
        store.update_edition(edition.id, &update).await.unwrap();

        let reloaded = store.get_edition(edition.id).await.unwrap();
        assert_eq!(reloaded.status, EditionStatus::Completed);
        assert_eq!(reloaded.total_pages, Some(12));
        assert_eq!(reloaded.total_articles, 5);
        assert!(reloaded.processed_at.is_some());
        assert_eq!(
            reloaded.processing_log.unwrap()["extraction_mode"],
            "heuristic"
        );
        // Untouched fields survive a partial update.
        assert_eq!(reloaded.file_hash, "upd");
    }

    #[tokio::test]
    async fn test_job_lifecycle_and_latest() {
        let (_dir, store) = store();
        let edition = store.create_edition(&new_edition("job")).await.unwrap();

        let first = store
            .create_job(&NewJob {
                edition_id: edition.id,
                status: JobStatus::Running,
                started_at: Utc::now(),
            })
            .await
            .unwrap();
        assert_eq!(first.status, JobStatus::Running);
        assert_eq!(first.page_current, 0);
        assert!(first.errors.is_empty());

        store
            .update_job(
                first.id,
                &JobUpdate {
                    status: Some(JobStatus::Completed),
                    page_current: Some(8),
                    page_total: Some(8),
                    articles_extracted: Some(14),
                    errors: Some(vec![crate::models::JobError::run_level("una página vacía")]),
                    finished_at: Some(Utc::now()),
                },
            )
            .await
            .unwrap();

        let reloaded = store.get_job(first.id).await.unwrap();
        assert_eq!(reloaded.status, JobStatus::Completed);
        assert_eq!(reloaded.articles_extracted, 14);
        assert_eq!(reloaded.errors.len(), 1);
        assert!(reloaded.finished_at.is_some());

        // A retry creates a second row; latest wins.
        let second = store
            .create_job(&NewJob {
                edition_id: edition.id,
                status: JobStatus::Running,
                started_at: Utc::now(),
            })
            .await
            .unwrap();
        let latest = store
            .latest_job_for_edition(edition.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[tokio::test]
    async fn test_article_dedup_by_content_hash() {
        let (_dir, store) = store();
        let edition = store.create_edition(&new_edition("art")).await.unwrap();
        let new = new_article(edition.id, "TITULAR UNO");

        assert!(!store.article_exists(&new.content_hash).await.unwrap());
        let article = store.create_article(&new).await.unwrap();
        assert_eq!(article.title, "TITULAR UNO");
        assert!(store.article_exists(&new.content_hash).await.unwrap());

        // Same content hash cannot be inserted twice.
        assert!(store.create_article(&new).await.is_err());
        assert_eq!(
            store.count_articles_for_edition(edition.id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_tag_upsert_attach_increment() {
        let (_dir, store) = store();
        let edition = store.create_edition(&new_edition("tag")).await.unwrap();
        let article = store
            .create_article(&new_article(edition.id, "TITULAR CON TAGS"))
            .await
            .unwrap();

        assert!(store.find_tag_by_name("futbol").await.unwrap().is_none());
        let tag = store
            .create_tag(&NewTag {
                name: "futbol".to_string(),
                display_name: "fútbol".to_string(),
                article_count: 0,
            })
            .await
            .unwrap();

        let found = store.find_tag_by_name("futbol").await.unwrap().unwrap();
        assert_eq!(found.id, tag.id);
        assert_eq!(found.display_name, "fútbol");

        store.attach_tag(article.id, tag.id, 0.4).await.unwrap();
        store.increment_tag_count(tag.id).await.unwrap();

        let reloaded = store.find_tag_by_name("futbol").await.unwrap().unwrap();
        assert_eq!(reloaded.article_count, 1);
        assert_eq!(store.count_tags().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cascade_delete_from_edition() {
        let (_dir, store) = store();
        let edition = store.create_edition(&new_edition("casc")).await.unwrap();
        store
            .create_article(&new_article(edition.id, "TITULAR"))
            .await
            .unwrap();
        store
            .create_job(&NewJob {
                edition_id: edition.id,
                status: JobStatus::Queued,
                started_at: Utc::now(),
            })
            .await
            .unwrap();

        let conn = store.connect().unwrap();
        conn.execute("DELETE FROM editions WHERE id = ?1", params![edition.id])
            .unwrap();
        assert_eq!(store.count_articles().await.unwrap(), 0);
        assert!(store
            .latest_job_for_edition(edition.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_counts() {
        let (_dir, store) = store();
        assert_eq!(store.count_editions().await.unwrap(), 0);
        let edition = store.create_edition(&new_edition("c1")).await.unwrap();
        store.create_edition(&new_edition("c2")).await.unwrap();
        store
            .create_article(&new_article(edition.id, "A"))
            .await
            .unwrap();
        assert_eq!(store.count_editions().await.unwrap(), 2);
        assert_eq!(store.count_articles().await.unwrap(), 1);
    }
}
