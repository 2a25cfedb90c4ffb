//! # cloudvault-storage
//!
//! Byte storage for CloudVault: the local filesystem provider, the manager
//! that owns the per-user object layout, and content hashing.

pub mod content;
pub mod manager;
pub mod providers;

pub use content::{digest_hex, guess_content_type};
pub use manager::StorageManager;
