//! In-memory object store
//!
//! Keeps blobs in a process-local map. Used for local development without an
//! S3 endpoint and by tests; nothing survives a restart.

use bytes::Bytes;
use dashmap::DashMap;
use heed_domain::ports::{ObjectKey, ObjectStore};
use heed_domain::PostError;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// A stored blob and its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

#[derive(Clone)]
pub struct MemoryObjectStore {
    objects: Arc<DashMap<String, StoredObject>>,
    public_base_url: String,
}

impl MemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(DashMap::new()),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<String, PostError>> + Send {
        let objects = self.objects.clone();
        let url = format!("{}/{}", self.public_base_url, key);
        let key = key.to_string();
        let content_type = content_type.to_string();

        async move {
            debug!(key = %key, size = data.len(), "Storing object in memory");
            objects.insert(key, StoredObject { data, content_type });
            Ok(url)
        }
    }
}
