//! Ingestion pipeline
//!
//! Turns a PDF on disk into a catalog record:
//! 1. Hash the file bytes into a content id
//! 2. Skip if the id is already catalogued
//! 3. Extract best-effort metadata
//! 4. Insert the paper; a concurrent insert of the same id is a no-op
//!
//! Hashing and extraction run on the blocking pool so the async runtime
//! serving the API is never stalled by file or PDF work.

use crate::errors::IngestionError;
use crate::hashing::hash_file;
use crate::pdf::{LopdfExtractor, MetadataExtractor};
use chrono::Utc;
use papershelf_common::db::models::Paper;
use papershelf_common::db::{NewPaper, Repository};
use papershelf_common::errors::AppError;
use papershelf_common::metrics::{record_ingestion, IngestOutcomeLabel};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Result of a single ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new record was written
    Ingested(Paper),
    /// Content already catalogued; nothing written
    AlreadyPresent { id: String },
}

impl IngestOutcome {
    pub fn paper_id(&self) -> &str {
        match self {
            IngestOutcome::Ingested(paper) => &paper.id,
            IngestOutcome::AlreadyPresent { id } => id,
        }
    }
}

/// Summary of a directory import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub ingested: usize,
    pub duplicates: usize,
    pub failed: usize,
}

/// Ingestion pipeline
pub struct IngestionPipeline {
    repository: Repository,
    extractor: Arc<dyn MetadataExtractor>,
}

impl IngestionPipeline {
    pub fn new(repository: Repository) -> Self {
        Self::with_extractor(repository, Arc::new(LopdfExtractor))
    }

    pub fn with_extractor(repository: Repository, extractor: Arc<dyn MetadataExtractor>) -> Self {
        Self {
            repository,
            extractor,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Ingest one file. Re-ingesting known content returns `AlreadyPresent`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn ingest(&self, path: &Path) -> Result<IngestOutcome, IngestionError> {
        let started = Instant::now();

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| IngestionError::InvalidPath {
                path: path.to_path_buf(),
            })?;

        let owned = path.to_path_buf();
        let id = tokio::task::spawn_blocking(move || hash_file(&owned)).await??;

        if self.repository.paper_exists(&id).await? {
            debug!(paper_id = %id, "Content already catalogued");
            record_ingestion(IngestOutcomeLabel::Duplicate, started.elapsed().as_secs_f64());
            return Ok(IngestOutcome::AlreadyPresent { id });
        }

        let extractor = Arc::clone(&self.extractor);
        let owned = path.to_path_buf();
        let metadata = tokio::task::spawn_blocking(move || extractor.extract(&owned)).await??;

        let new_paper = NewPaper {
            id,
            filename,
            title: metadata.title,
            authors: metadata.authors,
            abstract_text: metadata.abstract_text,
            year: metadata.year,
            date_added: Utc::now(),
        };

        match self.repository.insert_paper(new_paper).await {
            Ok(paper) => {
                info!(
                    paper_id = %paper.id,
                    filename = %paper.filename,
                    title = paper.title.as_deref().unwrap_or(""),
                    "Paper ingested"
                );
                record_ingestion(IngestOutcomeLabel::Ingested, started.elapsed().as_secs_f64());
                Ok(IngestOutcome::Ingested(paper))
            }
            // Lost a race with another ingestion of the same bytes
            Err(AppError::DuplicatePaper { id }) => {
                record_ingestion(IngestOutcomeLabel::Duplicate, started.elapsed().as_secs_f64());
                Ok(IngestOutcome::AlreadyPresent { id })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Ingest every PDF directly inside `dir`. Per-file failures are logged and counted.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn ingest_directory(&self, dir: &Path) -> Result<IngestReport, IngestionError> {
        info!("Importing directory of PDFs");

        let mut report = IngestReport::default();

        for path in pdf_files_in(dir)? {
            match self.ingest(&path).await {
                Ok(IngestOutcome::Ingested(_)) => report.ingested += 1,
                Ok(IngestOutcome::AlreadyPresent { .. }) => report.duplicates += 1,
                Err(e) => {
                    error!(
                        path = %path.display(),
                        error = %e,
                        "Failed to ingest PDF"
                    );
                    record_ingestion(IngestOutcomeLabel::Failed, 0.0);
                    report.failed += 1;
                }
            }
        }

        info!(
            ingested = report.ingested,
            duplicates = report.duplicates,
            failed = report.failed,
            "Directory import complete"
        );

        Ok(report)
    }
}

/// `.pdf` files (any case) directly inside `dir`, sorted by path
pub fn pdf_files_in(dir: &Path) -> Result<Vec<PathBuf>, IngestionError> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestionError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| IngestionError::io(dir, e))?.path();
        if path.is_file() && is_pdf(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// True for paths whose extension is `pdf`, case-insensitively
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
