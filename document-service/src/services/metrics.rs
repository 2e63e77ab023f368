//! Document pipeline metrics recorded through the `metrics` facade.

use crate::models::ExtractionSource;
use std::time::Duration;

pub fn record_extraction(source: ExtractionSource) {
    metrics::counter!("document_extractions_total", "source" => source.as_str()).increment(1);
}

pub fn record_provider_failure(provider: &str, kind: &'static str) {
    metrics::counter!(
        "ai_provider_failures_total",
        "provider" => provider.to_string(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_ocr_failure(mime_type: &str) {
    metrics::counter!("ocr_failures_total", "mime_type" => mime_type.to_string()).increment(1);
}

/// `outcome` is `processed`, `flagged` or `failed`.
pub fn record_ingest(outcome: &'static str) {
    metrics::counter!("document_ingest_total", "outcome" => outcome).increment(1);
}

pub fn record_pipeline_duration(elapsed: Duration) {
    metrics::histogram!("document_pipeline_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_reconciliation(matched: usize, gaps: usize) {
    metrics::counter!("reconciled_debits_total").increment(matched as u64);
    metrics::counter!("reconciliation_gaps_total").increment(gaps as u64);
}
