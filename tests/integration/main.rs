//! HTTP integration tests driving the full router against the in-memory backend.

mod file_test;
mod folder_test;
mod helpers;
mod user_test;
