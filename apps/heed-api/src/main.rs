//! Heed API
//!
//! HTTP service for publishing image posts, browsing the feed and liking
//! posts. Each uploaded photo is transcoded into a high and a low resolution
//! JPEG and written to object storage before the post is persisted.

mod auth;
mod config;
mod dto;
mod handlers;
mod routes;

use anyhow::{Context, Result};
use heed_domain::engagement::EngagementService;
use heed_domain::feed::{FeedConfig, FeedQueryService};
use heed_domain::ingestion::{IngestionConfig, PostIngestionService};
use heed_media::ImageTranscoder;
use heed_s3::{MemoryObjectStore, ObjectStoreBackend, S3ObjectStore};
use heed_store::{MemoryPostRepository, PgPostRepository, PostStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::auth::JwtAuthGate;
use crate::config::{AppConfig, LogFormat, StorageKind};

pub type IngestionService = PostIngestionService<ImageTranscoder, ObjectStoreBackend, PostStore>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ingestion: Arc<IngestionService>,
    pub feed: Arc<FeedQueryService<PostStore>>,
    pub engagement: Arc<EngagementService<PostStore>>,
    pub auth: Arc<JwtAuthGate>,
    /// Set when images are kept in memory and served by this process
    pub media: Option<MemoryObjectStore>,
}

impl AppState {
    pub fn new(
        transcoder: ImageTranscoder,
        store: ObjectStoreBackend,
        repository: PostStore,
        auth: JwtAuthGate,
        ingestion: IngestionConfig,
        feed: FeedConfig,
    ) -> Self {
        let media = match &store {
            ObjectStoreBackend::Memory(memory) => Some(memory.clone()),
            ObjectStoreBackend::S3(_) => None,
        };

        Self {
            ingestion: Arc::new(PostIngestionService::new(
                transcoder,
                store,
                repository.clone(),
                ingestion,
            )),
            feed: Arc::new(FeedQueryService::new(repository.clone(), feed)),
            engagement: Arc::new(EngagementService::new(repository)),
            auth: Arc::new(auth),
            media,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config);

    info!("Starting Heed API");

    let store = build_object_store(&config).await;
    let repository = build_repository(&config).await?;
    info!(
        object_store = store.name(),
        repository = repository.name(),
        max_image_bytes = config.ingestion.max_image_bytes,
        "Storage backends ready"
    );

    let state = AppState::new(
        ImageTranscoder::new(config.transcode.clone()),
        store,
        repository,
        JwtAuthGate::new(&config.jwt_secret),
        config.ingestion.clone(),
        config.feed.clone(),
    );

    // Build HTTP router
    let app = routes::create_router(state);

    let addr = config.bind_addr();
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn build_object_store(config: &AppConfig) -> ObjectStoreBackend {
    match config.storage {
        StorageKind::S3 => {
            info!(
                bucket = %config.s3.bucket,
                endpoint = ?config.s3.endpoint_url,
                "Using S3 object store"
            );
            S3ObjectStore::connect(&config.s3).await.into()
        }
        StorageKind::Memory => {
            warn!("Using in-memory object store, images are lost on restart");
            MemoryObjectStore::new(config.memory_public_base_url.clone()).into()
        }
    }
}

async fn build_repository(config: &AppConfig) -> Result<PostStore> {
    match &config.database_url {
        Some(url) => {
            let repository = PgPostRepository::connect(url, config.db_max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            repository
                .migrate()
                .await
                .context("Failed to run migrations")?;
            Ok(repository.into())
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory post repository");
            Ok(MemoryPostRepository::new().into())
        }
    }
}
