//! Paper entity
//!
//! One row per distinct PDF content. The primary key is the content hash,
//! so a second file with identical bytes can never produce a second row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    /// Hex content hash of the file bytes
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    /// File name inside the library folder
    #[sea_orm(column_type = "Text")]
    pub filename: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub title: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub authors: Option<String>,

    #[sea_orm(column_name = "abstract", column_type = "Text", nullable)]
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,

    pub year: Option<i32>,

    /// Set once at first insertion
    pub date_added: DateTimeUtc,

    pub last_accessed: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::paper_tag::Entity")]
    PaperTags,
}

impl Related<super::paper_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaperTags.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::paper_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::paper_tag::Relation::Paper.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
