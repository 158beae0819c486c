//! Service layer over the catalog store

mod library;

pub use library::{LibraryService, PaperQuery};
