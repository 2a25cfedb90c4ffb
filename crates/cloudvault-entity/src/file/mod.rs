//! File domain entities.

pub mod model;
pub mod search;
pub mod sort;

pub use model::{CreateFile, File, FileChanges};
pub use search::FileSearch;
pub use sort::FileSortKey;
