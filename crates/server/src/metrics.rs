//! Prometheus recording for pipeline and HTTP events.

use std::time::Duration;

use mmrag::{PipelineMetrics, PipelineStage};

pub const STAGE_DURATION_SECONDS: &str = "rag_stage_duration_seconds";
pub const QUERY_DURATION_SECONDS: &str = "rag_query_duration_seconds";
pub const QUERIES_TOTAL: &str = "rag_queries_total";
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

/// Forwards pipeline events to the global `metrics` recorder.
///
/// Without an installed recorder the macros are no-ops.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusPipelineMetrics;

impl PipelineMetrics for PrometheusPipelineMetrics {
    fn record_stage(&self, stage: PipelineStage, latency: Duration, ok: bool) {
        metrics::histogram!(
            STAGE_DURATION_SECONDS,
            "stage" => stage.as_str(),
            "outcome" => outcome(ok)
        )
        .record(latency.as_secs_f64());
    }

    fn record_query(&self, latency: Duration, ok: bool) {
        metrics::histogram!(QUERY_DURATION_SECONDS, "outcome" => outcome(ok))
            .record(latency.as_secs_f64());
        metrics::counter!(QUERIES_TOTAL, "outcome" => outcome(ok)).increment(1);
    }
}
