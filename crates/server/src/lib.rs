//! mmrag server: HTTP API over the retrieval-augmented query pipeline.
//!
//! Wires an [`mmrag::Orchestrator`] built from configuration into an axum
//! router. Request bodies use camelCase field names; every error is returned
//! as `{"error": {"code": "...", "message": "..."}}`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /api/rag/query` - Answer a question with cited sources
//! - `POST /api/rag/search` - Nearest passages, no generation
//! - `POST /api/rag/embed` - Embed a single text
//! - `POST /api/rag/generate` - Complete a raw prompt
//! - `GET /api/rag/stats` - Corpus statistics
//! - `DELETE /api/rag/documents/{id}` - Delete a document
//! - `GET /api/rag/health` - Liveness check
//! - `GET /api/rag/info` - Models and retrieval defaults
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
