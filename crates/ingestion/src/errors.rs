//! Ingestion error types

use papershelf_common::errors::AppError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF metadata extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("Path has no file name: {path}")]
    InvalidPath { path: PathBuf },

    #[error("Catalog error: {0}")]
    Catalog(#[from] AppError),

    #[error("Folder watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Ingestion worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl IngestionError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        IngestionError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn extraction(path: &Path, message: impl Into<String>) -> Self {
        IngestionError::Extraction {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
