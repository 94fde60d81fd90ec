use anyhow::Context;
use mmrag::RagConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// HTTP server settings plus the pipeline configuration it serves.
///
/// Every field is optional when loading; see [`Default`] for the values used.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Whole-request limit in seconds. Local generation is slow, so this
    /// sits above the provider's own timeout.
    pub timeout_secs: u64,
    pub max_body_size_mb: usize,
    /// Allow any origin, method and header.
    pub enable_cors: bool,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Install the Prometheus recorder and serve `/metrics`.
    pub metrics_enabled: bool,
    /// Deployment name reported by the health endpoint.
    pub environment: String,
    pub rag: RagConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            port: 8080,
            timeout_secs: 180,
            max_body_size_mb: 10,
            enable_cors: true,
            log_level: "info".into(),
            metrics_enabled: true,
            environment: "production".into(),
            rag: RagConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server.{toml,yaml,json}`
    /// file and `MMRAG__`-prefixed environment variables, in rising priority.
    ///
    /// Nested keys use `__`, e.g. `MMRAG__RAG__STORE__DATABASE_URL`. When no
    /// store URL is configured, the conventional `DATABASE_URL` is used.
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }

        let mut config: ServerConfig = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(config::Environment::with_prefix("MMRAG").separator("__"))
            .build()?
            .try_deserialize()
            .context("invalid server configuration")?;

        if config.rag.store.connection_target().is_none() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                config.rag.store.database_url = Some(url);
            }
        }

        config
            .rag
            .validate()
            .context("invalid pipeline configuration")?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address {}:{}", self.bind_addr, self.port))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb.saturating_mul(1024 * 1024)
    }
}
