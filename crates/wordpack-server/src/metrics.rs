//! Prometheus metrics for generation and upload outcomes.

use std::sync::Arc;

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabel, EncodeLabelSet, LabelSetEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct GenerationLabels {
    pub operation: &'static str,
    pub outcome: &'static str,
}

impl EncodeLabelSet for GenerationLabels {
    fn encode(&self, mut encoder: LabelSetEncoder) -> Result<(), std::fmt::Error> {
        ("operation", self.operation).encode(encoder.encode_label())?;
        ("outcome", self.outcome).encode(encoder.encode_label())?;
        Ok(())
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct OutcomeLabel(pub &'static str);

impl EncodeLabelSet for OutcomeLabel {
    fn encode(&self, mut encoder: LabelSetEncoder) -> Result<(), std::fmt::Error> {
        ("outcome", self.0).encode(encoder.encode_label())?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ServerMetrics {
    pub generations: Family<GenerationLabels, Counter>,
    pub uploads: Family<OutcomeLabel, Counter>,
    registry: Arc<Registry>,
}

impl ServerMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let generations = Family::<GenerationLabels, Counter>::default();
        registry.register(
            "wordpack_generations",
            "Generation requests by operation and outcome",
            generations.clone(),
        );

        let uploads = Family::<OutcomeLabel, Counter>::default();
        registry.register(
            "wordpack_uploads",
            "Image uploads by outcome",
            uploads.clone(),
        );

        Self {
            generations,
            uploads,
            registry: Arc::new(registry),
        }
    }

    /// `outcome` is one of `ok`, `fallback` or `error`.
    pub fn record_generation(&self, operation: &'static str, outcome: &'static str) {
        self.generations
            .get_or_create(&GenerationLabels { operation, outcome })
            .inc();
    }

    pub fn record_upload(&self, outcome: &'static str) {
        self.uploads.get_or_create(&OutcomeLabel(outcome)).inc();
    }

    /// Encode all metrics as Prometheus text format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        encode(&mut buf, &self.registry)?;
        Ok(buf)
    }
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_encoded_with_labels() {
        let metrics = ServerMetrics::new();
        metrics.record_generation("passage", "ok");
        metrics.record_generation("passage", "ok");
        metrics.record_generation("questions", "fallback");
        metrics.record_upload("rejected");

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"wordpack_generations_total{operation="passage",outcome="ok"} 2"#));
        assert!(text.contains(r#"wordpack_generations_total{operation="questions",outcome="fallback"} 1"#));
        assert!(text.contains(r#"wordpack_uploads_total{outcome="rejected"} 1"#));
    }
}
