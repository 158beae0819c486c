//! Repository pattern for catalog operations
//!
//! Every method is an independent short-lived statement or transaction.
//! Uniqueness of paper ids and tag names is enforced by the store itself,
//! which is what makes racing ingestions of the same content safe.

use crate::config::DatabaseConfig;
use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{is_unique_violation, AppError, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Index, OnConflict, Query, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Schema, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Ordering for paper listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperSort {
    /// Most recently viewed first
    Access,
    /// Most recently added first
    Added,
}

impl PaperSort {
    /// Parse a sort key; unknown keys yield `None` (store order)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "access" => Some(PaperSort::Access),
            "added" => Some(PaperSort::Added),
            _ => None,
        }
    }
}

/// Conjunctive filter for paper listings
#[derive(Debug, Clone, Default)]
pub struct PaperFilter {
    pub tag_id: Option<i32>,
    /// Case-insensitive substring of title or authors
    pub text: Option<String>,
    pub sort: Option<PaperSort>,
}

/// Fields for a paper's first insertion
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub id: String,
    pub filename: String,
    pub title: Option<String>,
    pub authors: Option<String>,
    pub abstract_text: Option<String>,
    pub year: Option<i32>,
    pub date_added: DateTime<Utc>,
}

/// Repository for catalog access
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the schema exists
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let repository = Self::new(DbPool::new(config).await?);
        repository.ensure_schema().await?;
        Ok(repository)
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    // ========================================================================
    // Schema & Health
    // ========================================================================

    /// Create tables and indexes that do not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn();
        let backend = conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut papers = schema.create_table_from_entity(PaperEntity);
        let mut tags = schema.create_table_from_entity(TagEntity);
        let mut paper_tags = schema.create_table_from_entity(PaperTagEntity);

        for table in [papers.if_not_exists(), tags.if_not_exists(), paper_tags.if_not_exists()] {
            conn.execute(backend.build(&*table)).await?;
        }

        let tag_index = Index::create()
            .if_not_exists()
            .name("idx_paper_tags_tag_id")
            .table(PaperTagEntity)
            .col(PaperTagColumn::TagId)
            .to_owned();
        conn.execute(backend.build(&tag_index)).await?;

        info!("Catalog schema ready");
        Ok(())
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Paper Operations
    // ========================================================================

    /// Insert a paper; a second insert for the same id fails with `DuplicatePaper`
    pub async fn insert_paper(&self, paper: NewPaper) -> Result<Paper> {
        let id = paper.id.clone();
        let model = PaperActiveModel {
            id: Set(paper.id),
            filename: Set(paper.filename),
            title: Set(paper.title),
            authors: Set(paper.authors),
            abstract_text: Set(paper.abstract_text),
            year: Set(paper.year),
            date_added: Set(paper.date_added),
            last_accessed: Set(None),
        };

        match model.insert(self.conn()).await {
            Ok(paper) => Ok(paper),
            Err(e) if is_unique_violation(&e) => Err(AppError::DuplicatePaper { id }),
            Err(e) => Err(e.into()),
        }
    }

    /// Find paper by ID
    pub async fn find_paper_by_id(&self, id: &str) -> Result<Option<Paper>> {
        PaperEntity::find_by_id(id.to_owned())
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Check whether a paper with this content id is catalogued
    pub async fn paper_exists(&self, id: &str) -> Result<bool> {
        let count = PaperEntity::find()
            .filter(PaperColumn::Id.eq(id))
            .count(self.conn())
            .await?;
        Ok(count > 0)
    }

    /// Total number of catalogued papers
    pub async fn count_papers(&self) -> Result<u64> {
        PaperEntity::find()
            .count(self.conn())
            .await
            .map_err(Into::into)
    }

    /// List papers matching every supplied filter
    pub async fn list_papers(&self, filter: &PaperFilter) -> Result<Vec<Paper>> {
        let mut select = PaperEntity::find();

        if let Some(tag_id) = filter.tag_id {
            select = select.filter(PaperColumn::Id.in_subquery(papers_with_tag(tag_id)));
        }

        select = match filter.sort {
            Some(PaperSort::Access) => select
                .order_by_desc(PaperColumn::LastAccessed)
                .order_by_asc(PaperColumn::Id),
            Some(PaperSort::Added) => select
                .order_by_desc(PaperColumn::DateAdded)
                .order_by_asc(PaperColumn::Id),
            None => select,
        };

        let mut papers = select.all(self.conn()).await?;

        // SQLite's lower() folds ASCII only, so the text filter runs here
        if let Some(text) = filter.text.as_deref() {
            let needle = text.to_lowercase();
            papers.retain(|paper| matches_text(paper, &needle));
        }

        Ok(papers)
    }

    /// Record a view of the paper; returns false when no such paper exists
    pub async fn touch_paper(&self, id: &str, at: DateTime<Utc>) -> Result<bool> {
        let result = PaperEntity::update_many()
            .col_expr(PaperColumn::LastAccessed, Expr::value(at))
            .filter(PaperColumn::Id.eq(id))
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Delete paper and its tag associations
    pub async fn delete_paper(&self, id: &str) -> Result<bool> {
        let txn = self.conn().begin().await?;

        PaperTagEntity::delete_many()
            .filter(PaperTagColumn::PaperId.eq(id))
            .exec(&txn)
            .await?;

        let result = PaperEntity::delete_by_id(id.to_owned()).exec(&txn).await?;
        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Tag Operations
    // ========================================================================

    /// Create a tag; a taken name fails with `DuplicateTag`
    pub async fn create_tag(&self, name: &str, hue: i32) -> Result<Tag> {
        let model = TagActiveModel {
            name: Set(name.to_owned()),
            hue: Set(hue),
            ..Default::default()
        };

        match model.insert(self.conn()).await {
            Ok(tag) => Ok(tag),
            Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateTag {
                name: name.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Find tag by ID
    pub async fn find_tag_by_id(&self, id: i32) -> Result<Option<Tag>> {
        TagEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// All tags, by name
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        TagEntity::find()
            .order_by_asc(TagColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Delete tag and its paper associations
    pub async fn delete_tag(&self, id: i32) -> Result<bool> {
        let txn = self.conn().begin().await?;

        PaperTagEntity::delete_many()
            .filter(PaperTagColumn::TagId.eq(id))
            .exec(&txn)
            .await?;

        let result = TagEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Association Operations
    // ========================================================================

    /// Associate a tag with a paper; returns false if already associated
    pub async fn attach_tag(&self, paper_id: &str, tag_id: i32) -> Result<bool> {
        let link = PaperTagActiveModel {
            paper_id: Set(paper_id.to_owned()),
            tag_id: Set(tag_id),
        };

        let inserted = PaperTagEntity::insert(link)
            .on_conflict(
                OnConflict::columns([PaperTagColumn::PaperId, PaperTagColumn::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.conn())
            .await?;

        debug!(paper_id, tag_id, inserted, "Tag attached");
        Ok(inserted > 0)
    }

    /// Remove an association; returns false if it did not exist
    pub async fn detach_tag(&self, paper_id: &str, tag_id: i32) -> Result<bool> {
        let result = PaperTagEntity::delete_many()
            .filter(PaperTagColumn::PaperId.eq(paper_id))
            .filter(PaperTagColumn::TagId.eq(tag_id))
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Tags attached to a paper, by name
    pub async fn tags_for_paper(&self, paper: &Paper) -> Result<Vec<Tag>> {
        paper
            .find_related(TagEntity)
            .order_by_asc(TagColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }
}

/// `SELECT paper_id FROM paper_tags WHERE tag_id = ?`
fn papers_with_tag(tag_id: i32) -> SelectStatement {
    Query::select()
        .column(PaperTagColumn::PaperId)
        .from(PaperTagEntity)
        .and_where(PaperTagColumn::TagId.eq(tag_id))
        .to_owned()
}

/// Case-insensitive substring of title or authors; `needle` is already lowercased
fn matches_text(paper: &Paper, needle: &str) -> bool {
    [paper.title.as_deref(), paper.authors.as_deref()]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}
