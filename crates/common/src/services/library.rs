//! Query and tag operations used by the API
//!
//! Translates absent rows into `PaperNotFound` / `TagNotFound`, keeps the
//! "record missing" and "file missing" cases apart for PDF retrieval, and
//! normalises listing parameters before they reach the repository.

use crate::db::models::{Paper, Tag};
use crate::db::{PaperFilter, PaperSort, Repository};
use crate::errors::{AppError, Result};
use chrono::Utc;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Listing parameters as they arrive from callers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaperQuery {
    /// Tag id to restrict to
    pub tag: Option<i32>,
    /// Substring of title or authors
    pub query: Option<String>,
    /// `access` or `added`; anything else keeps store order
    pub sort: Option<String>,
}

impl PaperQuery {
    fn into_filter(self) -> PaperFilter {
        PaperFilter {
            tag_id: self.tag,
            text: self
                .query
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty()),
            sort: self.sort.as_deref().and_then(PaperSort::parse),
        }
    }
}

#[derive(Clone)]
pub struct LibraryService {
    repository: Repository,
}

impl LibraryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub async fn ping(&self) -> Result<()> {
        self.repository.ping().await
    }

    pub async fn list_papers(&self, query: PaperQuery) -> Result<Vec<Paper>> {
        let filter = query.into_filter();
        debug!(?filter, "Listing papers");
        self.repository.list_papers(&filter).await
    }

    pub async fn get_paper(&self, id: &str) -> Result<Paper> {
        self.repository
            .find_paper_by_id(id)
            .await?
            .ok_or_else(|| AppError::PaperNotFound { id: id.to_string() })
    }

    /// Fetch a paper for viewing and stamp `last_accessed`
    pub async fn open_paper(&self, id: &str) -> Result<Paper> {
        let mut paper = self.get_paper(id).await?;
        let now = Utc::now();
        if self.repository.touch_paper(id, now).await? {
            paper.last_accessed = Some(now);
        }
        Ok(paper)
    }

    /// Locate the PDF backing a paper inside the library folder.
    /// `last_accessed` is stamped only once the file is known to exist.
    pub async fn resolve_pdf(&self, id: &str, folder: Option<&Path>) -> Result<(Paper, PathBuf)> {
        let mut paper = self.get_paper(id).await?;

        let missing = |path: String| AppError::PdfMissing {
            id: id.to_string(),
            path,
        };

        let folder = folder.ok_or_else(|| missing(paper.filename.clone()))?;

        // Only the bare file name is trusted; never follow separators stored in the record
        let name = Path::new(&paper.filename)
            .file_name()
            .ok_or_else(|| missing(paper.filename.clone()))?;
        let path = folder.join(name);

        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(missing(path.display().to_string()));
        }

        let now = Utc::now();
        if self.repository.touch_paper(id, now).await? {
            paper.last_accessed = Some(now);
        }

        Ok((paper, path))
    }

    pub async fn delete_paper(&self, id: &str) -> Result<()> {
        if !self.repository.delete_paper(id).await? {
            return Err(AppError::PaperNotFound { id: id.to_string() });
        }
        info!(paper_id = %id, "Paper removed from catalog");
        Ok(())
    }

    pub async fn create_tag(&self, name: &str, hue: i32) -> Result<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation {
                message: "tag name must not be empty".to_string(),
            });
        }

        let tag = self.repository.create_tag(name, hue).await?;
        info!(tag_id = tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.repository.list_tags().await
    }

    pub async fn delete_tag(&self, id: i32) -> Result<()> {
        if !self.repository.delete_tag(id).await? {
            return Err(AppError::TagNotFound { id });
        }
        info!(tag_id = id, "Tag deleted");
        Ok(())
    }

    pub async fn get_tag(&self, id: i32) -> Result<Tag> {
        self.repository
            .find_tag_by_id(id)
            .await?
            .ok_or(AppError::TagNotFound { id })
    }

    pub async fn paper_tags(&self, paper_id: &str) -> Result<Vec<Tag>> {
        let paper = self.get_paper(paper_id).await?;
        self.repository.tags_for_paper(&paper).await
    }

    /// Attach a tag; attaching twice is a no-op
    pub async fn tag_paper(&self, paper_id: &str, tag_id: i32) -> Result<()> {
        self.get_paper(paper_id).await?;
        self.get_tag(tag_id).await?;
        self.repository.attach_tag(paper_id, tag_id).await?;
        Ok(())
    }

    pub async fn untag_paper(&self, paper_id: &str, tag_id: i32) -> Result<()> {
        self.get_paper(paper_id).await?;
        self.get_tag(tag_id).await?;
        self.repository.detach_tag(paper_id, tag_id).await?;
        Ok(())
    }
}
