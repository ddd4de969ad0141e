//! Service layer for the digitization pipeline.
//!
//! This module contains domain logic separated from UI concerns.
//! Services can be used by the CLI or other callers.

pub mod edition;
pub mod extraction;

pub use edition::{extract_date_from_filename, EditionService, ImportError, ImportOutcome};
pub use extraction::{ExtractionPipeline, PipelineError, RunSummary};
