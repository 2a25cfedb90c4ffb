//! Folder domain entities.

pub mod breadcrumb;
pub mod model;

pub use breadcrumb::BreadcrumbEntry;
pub use model::{CreateFolder, Folder, PATH_SEPARATOR, PurgeOutcome};
