//! # cloudvault-service
//!
//! Business logic for CloudVault. Each service orchestrates the store
//! traits and the storage manager to implement one group of use cases.
//!
//! Services take their dependencies at construction time and receive the
//! caller as an explicit [`RequestContext`] on every call.

pub mod context;
pub mod file;
pub mod folder;
pub mod user;

#[cfg(test)]
mod test_support;

pub use context::RequestContext;
pub use file::{FileService, SearchService, UploadService};
pub use folder::FolderService;
pub use user::UserService;
