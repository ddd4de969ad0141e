//! Hemeroteca - newspaper PDF digitization and article extraction.
//!
//! Converts scanned-in-print newspaper editions (PDF files) into a
//! searchable corpus of individual, tagged, deduplicated articles.

pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod pdf;
pub mod repository;
pub mod segmenter;
pub mod services;
pub mod tags;
pub mod utils;
