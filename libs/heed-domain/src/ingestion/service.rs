//! Post ingestion service - Business logic orchestration
//!
//! Validation, then one transcode + upload pipeline per image, then a single
//! repository insert. The repository is only written when every pipeline
//! succeeded.

use bytes::Bytes;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::identity::{Identity, UserId};
use crate::post::{
    ImageVariant, Post, PostDraft, PostError, PostSubmission, RawImage, Result, MAX_IMAGES,
};
use crate::ports::{
    MediaTranscoder, ObjectKey, ObjectStore, PostRepository, Rendition, JPEG_CONTENT_TYPE,
};

/// Configuration for the ingestion service
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Maximum size of one submitted image in bytes (default: 10MB)
    pub max_image_bytes: usize,
    /// Extra upload attempts after a failed put (default: 2)
    pub upload_retries: u32,
    /// Delay before the first retry, doubled on each further retry
    pub retry_backoff: Duration,
    /// Upper bound for one image's transcode + upload pipeline
    pub pipeline_timeout: Duration,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024, // 10MB
            upload_retries: 2,
            retry_backoff: Duration::from_millis(100),
            pipeline_timeout: Duration::from_secs(30),
        }
    }
}

/// Service for publishing posts
///
/// The service is generic over its ports. The transcoder is shared with the
/// blocking thread pool, hence the `Arc`.
pub struct PostIngestionService<T, S, R> {
    transcoder: Arc<T>,
    store: S,
    repository: R,
    config: IngestionConfig,
}

impl<T, S, R> PostIngestionService<T, S, R>
where
    T: MediaTranscoder + 'static,
    S: ObjectStore,
    R: PostRepository,
{
    pub fn new(transcoder: T, store: S, repository: R, config: IngestionConfig) -> Self {
        Self {
            transcoder: Arc::new(transcoder),
            store,
            repository,
            config,
        }
    }

    /// Validate, transcode, upload and persist a new post
    ///
    /// # Errors
    ///
    /// - `PostError::Validation` for bad input; nothing is transcoded or uploaded
    /// - `PostError::Transcode` if an image cannot be decoded
    /// - `PostError::Upload` if storage fails after retries or a pipeline times out
    /// - `PostError::Repository` if the post cannot be persisted
    ///
    /// On any error after validation no post is written. Blobs uploaded by
    /// pipelines that had already finished are left orphaned.
    #[instrument(
        skip(self, identity, submission),
        fields(owner = %identity.id, images = submission.images.len())
    )]
    pub async fn create_post(
        &self,
        identity: &Identity,
        submission: PostSubmission,
    ) -> Result<Post> {
        let PostSubmission {
            title,
            description,
            price,
            allow_comments,
            allow_likes,
            images,
        } = submission;

        let draft = PostDraft::builder(identity)
            .title(title)
            .description(description)
            .price(price)
            .allow_comments(allow_comments.unwrap_or(true))
            .allow_likes(allow_likes.unwrap_or(true))
            .build()?;
        self.validate_images(&images)?;

        let pipelines = images
            .into_iter()
            .enumerate()
            .map(|(position, image)| self.process_image(&identity.id, position, image));

        // First failure drops the remaining pipelines
        let variants = try_join_all(pipelines).await.map_err(|err| {
            error!(error = %err, "Image pipeline failed, post not persisted");
            err
        })?;

        let post = Post::create(draft, variants)?;
        self.repository.insert(&post).await?;

        info!(post_id = %post.id(), images = post.images().len(), "Post created");
        Ok(post)
    }

    fn validate_images(&self, images: &[RawImage]) -> Result<()> {
        if images.is_empty() || images.len() > MAX_IMAGES {
            return Err(PostError::validation(format!(
                "You can upload 1 to {MAX_IMAGES} images only"
            )));
        }

        for (position, image) in images.iter().enumerate() {
            if image.size() == 0 {
                return Err(PostError::validation(format!(
                    "Image {} is empty",
                    position + 1
                )));
            }
            if image.size() > self.config.max_image_bytes {
                return Err(PostError::validation(format!(
                    "Image {} is too large ({} bytes, maximum {} bytes)",
                    position + 1,
                    image.size(),
                    self.config.max_image_bytes
                )));
            }
        }
        Ok(())
    }

    /// Run one image's pipeline under the configured timeout
    async fn process_image(
        &self,
        owner: &UserId,
        position: usize,
        image: RawImage,
    ) -> Result<ImageVariant> {
        let limit = self.config.pipeline_timeout;

        match tokio::time::timeout(limit, self.run_pipeline(owner, position, image)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(position, timeout = ?limit, "Image pipeline timed out");
                Err(PostError::upload(format!(
                    "processing image {} timed out after {:?}",
                    position + 1,
                    limit
                )))
            }
        }
    }

    async fn run_pipeline(
        &self,
        owner: &UserId,
        position: usize,
        image: RawImage,
    ) -> Result<ImageVariant> {
        let transcoder = Arc::clone(&self.transcoder);
        let data = image.data;

        let transcoded = tokio::task::spawn_blocking(move || transcoder.transcode(&data))
            .await
            .map_err(|e| PostError::transcode(format!("transcode task failed: {e}")))??;

        debug!(
            position,
            high_bytes = transcoded.high.len(),
            low_bytes = transcoded.low.len(),
            "Image transcoded"
        );

        let file_name = image.file_name.as_deref();
        let high_key = ObjectKey::generate(owner, file_name, position, Rendition::High);
        let low_key = ObjectKey::generate(owner, file_name, position, Rendition::Low);

        let (high, low) = tokio::try_join!(
            self.put_with_retry(&high_key, transcoded.high),
            self.put_with_retry(&low_key, transcoded.low),
        )?;

        Ok(ImageVariant { high, low })
    }

    /// Upload with bounded retries and exponential backoff
    ///
    /// Only `PostError::Upload` is retried.
    async fn put_with_retry(&self, key: &ObjectKey, data: Bytes) -> Result<String> {
        let mut attempt = 0;
        let mut backoff = self.config.retry_backoff;

        loop {
            match self.store.put(key, data.clone(), JPEG_CONTENT_TYPE).await {
                Ok(url) => return Ok(url),
                Err(err @ PostError::Upload(_)) if attempt < self.config.upload_retries => {
                    attempt += 1;
                    warn!(
                        key = %key,
                        error = %err,
                        "Upload attempt {}/{} failed, retrying in {:?}",
                        attempt,
                        self.config.upload_retries,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Get the service configuration
    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }
}
