use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the hosted storage REST API.
    pub storage_url: String,
    /// Bearer key for the hosted storage API.
    pub storage_key: String,
    /// Bucket holding all managed objects.
    pub bucket: String,
    /// Served static-assets root the local fallback mirrors into.
    pub static_root: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Media upload and folder management API")]
pub struct Args {
    /// Host to bind to (overrides MEDIA_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides MEDIA_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Storage API base URL (overrides MEDIA_STORE_STORAGE_URL)
    #[arg(long)]
    pub storage_url: Option<String>,

    /// Storage API key (overrides MEDIA_STORE_STORAGE_KEY)
    #[arg(long)]
    pub storage_key: Option<String>,

    /// Storage bucket name (overrides MEDIA_STORE_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Static-assets root for the local fallback (overrides MEDIA_STORE_STATIC_ROOT)
    #[arg(long)]
    pub static_root: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("MEDIA_STORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("MEDIA_STORE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing MEDIA_STORE_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading MEDIA_STORE_PORT"),
        };
        let env_storage_url = env::var("MEDIA_STORE_STORAGE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:54321/storage/v1".into());
        let env_storage_key = env::var("MEDIA_STORE_STORAGE_KEY").unwrap_or_default();
        let env_bucket = env::var("MEDIA_STORE_BUCKET").unwrap_or_else(|_| "images".into());
        let env_static_root =
            env::var("MEDIA_STORE_STATIC_ROOT").unwrap_or_else(|_| "./public".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_url: args.storage_url.unwrap_or(env_storage_url),
            storage_key: args.storage_key.unwrap_or(env_storage_key),
            bucket: args.bucket.unwrap_or(env_bucket),
            static_root: args.static_root.unwrap_or(env_static_root),
        };

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
