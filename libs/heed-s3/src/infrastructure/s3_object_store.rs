//! S3 Object Store Implementation
//!
//! This module implements the `ObjectStore` port using an S3-compatible
//! service as the backend. It handles the S3 calls and converts AWS errors to
//! domain errors.

use aws_sdk_s3::config::{BehaviorVersion, Builder as S3ConfigBuilder, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::{primitives::ByteStream, Client};
use bytes::Bytes;
use heed_domain::ports::{ObjectKey, ObjectStore};
use heed_domain::PostError;
use std::future::Future;
use tracing::{debug, error, info, instrument};

/// Connection settings for an S3-compatible service
#[derive(Debug, Clone, Default)]
pub struct S3Settings {
    pub bucket: String,
    /// AWS region; falls back to the SDK's default provider chain
    pub region: Option<String>,
    /// Custom endpoint URL (for R2, MinIO, LocalStack, etc.)
    pub endpoint_url: Option<String>,
    /// Path-style addressing, required by MinIO
    pub force_path_style: bool,
    /// Base of the public URLs handed back to clients
    pub public_base_url: Option<String>,
}

impl S3Settings {
    /// Public URL base used when none is configured
    ///
    /// With a custom endpoint objects are addressed path-style under it,
    /// otherwise the virtual-hosted AWS URL is used.
    pub fn resolved_public_base_url(&self) -> String {
        match (&self.public_base_url, &self.endpoint_url) {
            (Some(base), _) => base.clone(),
            (None, Some(endpoint)) => {
                format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
            }
            (None, None) => format!("https://{}.s3.amazonaws.com", self.bucket),
        }
    }
}

/// S3-based implementation of the ObjectStore port
///
/// Objects are written with the key chosen by the domain and their content
/// type. The returned URL is `{public_base_url}/{key}`; making the bucket (or
/// a CDN in front of it) publicly readable is a deployment concern.
///
/// ## Error Handling
///
/// All AWS SDK errors are converted to `PostError::Upload` with the full
/// error context for debugging. The domain logs them and reports a generic
/// failure to clients.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    /// Create a new S3 object store
    ///
    /// # Arguments
    ///
    /// * `client` - Configured AWS S3 client
    /// * `bucket` - Name of the S3 bucket to use
    /// * `public_base_url` - Base of the returned public URLs
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aws_sdk_s3::Client;
    /// use heed_s3::S3ObjectStore;
    ///
    /// # async fn example() {
    /// let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    /// let s3_client = Client::new(&config);
    /// let store = S3ObjectStore::new(s3_client, "heed", "https://cdn.example.com");
    /// # }
    /// ```
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let bucket = bucket.into();
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        info!(bucket = %bucket, public_base_url = %public_base_url, "Initializing S3ObjectStore");
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    /// Build the SDK client from settings and the environment's credentials
    pub async fn connect(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let aws_config = loader.load().await;

        let mut builder = S3ConfigBuilder::from(&aws_config);
        if let Some(endpoint_url) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        if settings.force_path_style {
            builder = builder.force_path_style(true);
        }

        let client = Client::from_conf(builder.build());
        Self::new(client, settings.bucket.clone(), settings.resolved_public_base_url())
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of an object
    pub fn public_url(&self, key: &ObjectKey) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self, data), fields(key = %key, data_size = data.len()))]
    fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<String, PostError>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let url = self.public_url(key);
        let key = key.to_string();
        let content_type = content_type.to_string();

        async move {
            debug!(key = %key, bucket = %bucket, "Uploading object to S3");

            match client
                .put_object()
                .bucket(&bucket)
                .key(&key)
                .content_type(content_type)
                .body(ByteStream::from(data))
                .send()
                .await
            {
                Ok(_) => {
                    info!(key = %key, "Successfully uploaded object to S3");
                    Ok(url)
                }
                Err(err) => {
                    error!(
                        key = %key,
                        error = %DisplayErrorContext(&err),
                        "Failed to upload object to S3"
                    );
                    Err(PostError::upload(format!(
                        "S3 put_object failed for key '{}': {}",
                        key,
                        DisplayErrorContext(&err)
                    )))
                }
            }
        }
    }
}
