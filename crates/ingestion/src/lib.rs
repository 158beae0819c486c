//! Papershelf Ingestion
//!
//! Turns PDF files on disk into catalog records:
//! - Content hashing for stable, deduplicating paper ids
//! - Metadata extraction from the PDF info dictionary
//! - The ingestion pipeline that ties both to the catalog
//! - A folder watcher feeding a bounded worker pool

pub mod errors;
pub mod hashing;
pub mod pdf;
pub mod processor;
pub mod watcher;

#[cfg(test)]
mod fixtures;

pub use errors::IngestionError;
pub use pdf::{LopdfExtractor, MetadataExtractor, PdfMetadata};
pub use processor::{IngestOutcome, IngestReport, IngestionPipeline};
pub use watcher::{start_watcher, WatcherHandle};
