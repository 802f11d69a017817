//! Ingestion domain module
//!
//! Turns a raw submission into a persisted post: validation, per-image
//! transcode and upload, then a single repository insert.

mod service;

pub use service::{IngestionConfig, PostIngestionService};
