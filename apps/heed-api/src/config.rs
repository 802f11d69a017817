//! Runtime configuration read from the environment

use anyhow::{bail, Context, Result};
use heed_domain::feed::FeedConfig;
use heed_domain::ingestion::IngestionConfig;
use heed_media::TranscodeConfig;
use heed_s3::S3Settings;
use std::str::FromStr;
use std::time::Duration;

/// Where image renditions are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    S3,
    Memory,
}

impl FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown storage backend '{other}' (expected 's3' or 'memory')"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => bail!("unknown log format '{other}' (expected 'pretty' or 'json')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub storage: StorageKind,
    pub s3: S3Settings,
    /// Base URL for objects kept by the in-memory store
    pub memory_public_base_url: String,
    /// Unset selects the in-memory post repository
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub ingestion: IngestionConfig,
    pub transcode: TranscodeConfig,
    pub feed: FeedConfig,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which returns a variable's value if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get("HEED_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(&get, "HEED_PORT", 5000)?;

        let jwt_secret = get("HEED_JWT_SECRET").context("HEED_JWT_SECRET must be set")?;

        let storage: StorageKind = parse_or(&get, "HEED_STORAGE", StorageKind::S3)?;
        let bucket = get("HEED_BUCKET").unwrap_or_else(|| "heed".to_string());
        let endpoint_url = get("HEED_S3_ENDPOINT");
        let public_base_url = get("HEED_PUBLIC_BASE_URL");
        let memory_public_base_url = public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{port}/media"));
        let s3 = S3Settings {
            bucket,
            region: get("HEED_S3_REGION"),
            force_path_style: endpoint_url.is_some(),
            endpoint_url,
            public_base_url,
        };

        let database_url = get("DATABASE_URL");
        let db_max_connections = parse_or(&get, "HEED_DB_MAX_CONNECTIONS", 10)?;

        let defaults = IngestionConfig::default();
        let ingestion = IngestionConfig {
            max_image_bytes: parse_or(&get, "HEED_MAX_IMAGE_BYTES", defaults.max_image_bytes)?,
            upload_retries: parse_or(&get, "HEED_UPLOAD_RETRIES", defaults.upload_retries)?,
            pipeline_timeout: Duration::from_secs(parse_or(
                &get,
                "HEED_PIPELINE_TIMEOUT_SECS",
                defaults.pipeline_timeout.as_secs(),
            )?),
            ..defaults
        };
        if ingestion.max_image_bytes == 0 {
            bail!("HEED_MAX_IMAGE_BYTES must be greater than zero");
        }

        let defaults = TranscodeConfig::default();
        let transcode = TranscodeConfig {
            low_width: parse_or(&get, "HEED_LOW_WIDTH", defaults.low_width)?,
            high_quality: parse_or(&get, "HEED_HIGH_QUALITY", defaults.high_quality)?,
            low_quality: parse_or(&get, "HEED_LOW_QUALITY", defaults.low_quality)?,
        };
        if transcode.low_width == 0 {
            bail!("HEED_LOW_WIDTH must be greater than zero");
        }
        for (name, quality) in [
            ("HEED_HIGH_QUALITY", transcode.high_quality),
            ("HEED_LOW_QUALITY", transcode.low_quality),
        ] {
            if !(1..=100).contains(&quality) {
                bail!("{name} must be between 1 and 100 (got {quality})");
            }
        }

        Ok(Self {
            host,
            port,
            jwt_secret,
            storage,
            s3,
            memory_public_base_url,
            database_url,
            db_max_connections,
            ingestion,
            transcode,
            feed: FeedConfig::default(),
            log_level: get("HEED_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format: parse_or(&get, "HEED_LOG_FORMAT", LogFormat::Pretty)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {name} ('{raw}'): {e}")),
        None => Ok(default),
    }
}
