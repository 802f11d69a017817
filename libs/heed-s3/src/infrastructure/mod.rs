mod backend;
mod memory;
mod s3_object_store;

pub use backend::ObjectStoreBackend;
pub use memory::{MemoryObjectStore, StoredObject};
pub use s3_object_store::{S3ObjectStore, S3Settings};
