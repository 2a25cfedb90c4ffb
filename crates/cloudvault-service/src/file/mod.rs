//! File services: ingestion, metadata lifecycle, and queries.

pub mod search;
pub mod service;
pub mod upload;

pub use search::{SearchResults, SearchService};
pub use service::{Download, FileService, FileUpdate};
pub use upload::{BulkUploadReport, UploadFailure, UploadInput, UploadOutcome, UploadService};
