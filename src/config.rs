//! Environment-driven configuration.
//!
//! All settings come from environment variables (optionally loaded from a
//! `.env` file at startup). Remote credentials are optional: without an
//! Anthropic key the pipeline uses heuristic segmentation, and without
//! Supabase credentials there is no REST fallback for persistence.

use std::path::{Path, PathBuf};

/// Runtime configuration for the extraction pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,
    /// Anthropic API key; enables the AI extraction path when set.
    pub anthropic_api_key: Option<String>,
    /// Supabase project URL; enables the PostgREST persistence fallback.
    pub supabase_url: Option<String>,
    /// Supabase service role key for the PostgREST fallback.
    pub supabase_service_key: Option<String>,
    /// Root directory for stored edition PDFs.
    pub storage_root: PathBuf,
    /// Writable runtime root (e.g. /tmp/storage/app on serverless hosts).
    pub runtime_root: PathBuf,
    /// Default newspaper name for imported editions.
    pub newspaper_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("hemeroteca.db"),
            anthropic_api_key: None,
            supabase_url: None,
            supabase_service_key: None,
            storage_root: PathBuf::from("storage"),
            runtime_root: PathBuf::from("/tmp/storage/app"),
            newspaper_name: "El Heraldo".to_string(),
        }
    }
}

impl Config {
    /// Build the configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_path: env_path("DATABASE_PATH").unwrap_or(defaults.database_path),
            anthropic_api_key: env_nonempty("ANTHROPIC_API_KEY"),
            supabase_url: env_nonempty("SUPABASE_URL"),
            supabase_service_key: env_nonempty("SUPABASE_SERVICE_KEY"),
            storage_root: env_path("STORAGE_ROOT").unwrap_or(defaults.storage_root),
            runtime_root: env_path("RUNTIME_ROOT").unwrap_or(defaults.runtime_root),
            newspaper_name: env_nonempty("NEWSPAPER_NAME").unwrap_or(defaults.newspaper_name),
        }
    }

    /// Resolve a stored edition path against the known roots.
    ///
    /// Tries the literal path, then the runtime root, then the storage
    /// root; the first location that exists wins. Returns `None` when the
    /// file cannot be found anywhere, which is fatal for an extraction run.
    pub fn resolve_file_path(&self, stored_path: &str) -> Option<PathBuf> {
        let literal = Path::new(stored_path);
        if literal.exists() {
            return Some(literal.to_path_buf());
        }

        let runtime = self.runtime_root.join(stored_path);
        if runtime.exists() {
            return Some(runtime);
        }

        let storage = self.storage_root.join(stored_path);
        if storage.exists() {
            return Some(storage);
        }

        None
    }

    /// Whether the AI extraction path is configured.
    pub fn ai_available(&self) -> bool {
        self.anthropic_api_key.is_some()
    }

    /// Whether the PostgREST persistence fallback is configured.
    pub fn rest_available(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_service_key.is_some()
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_nonempty(key).map(PathBuf::from)
}
