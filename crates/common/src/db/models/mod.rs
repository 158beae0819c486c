//! SeaORM entity models
//!
//! Catalog tables: papers, tags, and the paper_tags association

mod paper;
mod paper_tag;
mod tag;

pub use paper::{
    Entity as PaperEntity,
    Model as Paper,
    ActiveModel as PaperActiveModel,
    Column as PaperColumn,
};

pub use tag::{
    Entity as TagEntity,
    Model as Tag,
    ActiveModel as TagActiveModel,
    Column as TagColumn,
};

pub use paper_tag::{
    Entity as PaperTagEntity,
    Model as PaperTag,
    ActiveModel as PaperTagActiveModel,
    Column as PaperTagColumn,
};
