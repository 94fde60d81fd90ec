use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::metrics::PrometheusPipelineMetrics;
use metrics_exporter_prometheus::PrometheusHandle;
use mmrag::Orchestrator;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Query pipeline (shared across requests)
    pub orchestrator: Arc<Orchestrator>,

    /// Prometheus render handle, present when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Build the pipeline from `config.rag`. The PostgreSQL pool connects
    /// lazily, so this needs a Tokio runtime but not a reachable database.
    pub fn new(config: ServerConfig, metrics: Option<PrometheusHandle>) -> ServerResult<Self> {
        let mut orchestrator = config
            .rag
            .build_orchestrator()
            .map_err(|err| ServerError::Config(err.to_string()))?;
        if metrics.is_some() {
            orchestrator = orchestrator.with_metrics(Arc::new(PrometheusPipelineMetrics));
        }
        Ok(Self::from_parts(config, orchestrator, metrics))
    }

    /// Wrap an already wired pipeline.
    pub fn from_parts(
        config: ServerConfig,
        orchestrator: Orchestrator,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            metrics,
        }
    }
}
