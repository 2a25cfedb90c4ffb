//! # cloudvault-database
//!
//! Persistence for CloudVault: the store traits services depend on, the
//! PostgreSQL repositories implementing them, and an in-memory backend
//! with the same semantics.

pub mod backend;
pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use backend::Database;
pub use connection::DatabasePool;
pub use memory::MemoryDatabase;
pub use store::{FileStore, FolderStore, UserStore};
