//! # cloudvault-api
//!
//! HTTP API layer for CloudVault built on Axum.
//!
//! Provides the REST endpoints for files, folders and the caller's account,
//! the caller-identity extractor, CORS and logging middleware, DTOs, and the
//! mapping from `AppError` to HTTP status codes.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use state::AppState;
