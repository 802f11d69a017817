//! # Heed object storage adapters
//!
//! Implementations of the `ObjectStore` port:
//!
//! - [`S3ObjectStore`]: any S3-compatible service (AWS S3, Cloudflare R2, MinIO)
//! - [`MemoryObjectStore`]: process-local map for development and tests
//!
//! [`ObjectStoreBackend`] picks one of them at startup while keeping static
//! dispatch in the services.

pub mod infrastructure;

pub use infrastructure::{
    MemoryObjectStore, ObjectStoreBackend, S3ObjectStore, S3Settings, StoredObject,
};
