//! Runtime selection between object store implementations

use bytes::Bytes;
use heed_domain::ports::{ObjectKey, ObjectStore};
use heed_domain::PostError;
use std::future::Future;

use super::{MemoryObjectStore, S3ObjectStore};

/// The object store chosen at startup
///
/// An enum rather than a trait object: the port's `impl Future` methods keep
/// it statically dispatched.
#[derive(Clone)]
pub enum ObjectStoreBackend {
    S3(S3ObjectStore),
    Memory(MemoryObjectStore),
}

impl ObjectStoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3(_) => "s3",
            Self::Memory(_) => "memory",
        }
    }
}

impl From<S3ObjectStore> for ObjectStoreBackend {
    fn from(store: S3ObjectStore) -> Self {
        Self::S3(store)
    }
}

impl From<MemoryObjectStore> for ObjectStoreBackend {
    fn from(store: MemoryObjectStore) -> Self {
        Self::Memory(store)
    }
}

impl ObjectStore for ObjectStoreBackend {
    fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<String, PostError>> + Send {
        async move {
            match self {
                Self::S3(store) => store.put(key, data, content_type).await,
                Self::Memory(store) => store.put(key, data, content_type).await,
            }
        }
    }
}
