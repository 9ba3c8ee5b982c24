//! Prometheus adapter for detection outcome metrics.
//!
//! Metrics are registered with a provided registry and exposed via the
//! `/metrics` endpoint.

use async_trait::async_trait;
use prometheus::{CounterVec, Histogram, HistogramOpts, Opts, Registry};

use crate::domain::ports::{DetectionMetrics, DetectionMetricsError, DetectionOutcome};

/// Prometheus-backed detection metrics recorder.
///
/// # Metric Specification
///
/// - `redecor_detection_requests_total` (counter), labelled by `outcome`:
///   `succeeded`, `unreachable`, `timed_out`, `retry_exhausted`, `rejected`
///   or `persistence_failed`.
/// - `redecor_detection_attempts` (histogram): detector calls per request.
/// - `redecor_detected_objects_total` (counter): inventory items created from
///   detections.
pub struct PrometheusDetectionMetrics {
    requests_total: CounterVec,
    attempts: Histogram,
    objects_total: prometheus::Counter,
}

impl PrometheusDetectionMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric cannot be registered, for example when
    /// one with the same name already exists in the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests_total = CounterVec::new(
            Opts::new(
                "redecor_detection_requests_total",
                "Total detection requests by outcome",
            ),
            &["outcome"],
        )?;
        let attempts = Histogram::with_opts(
            HistogramOpts::new(
                "redecor_detection_attempts",
                "Detector calls made per detection request",
            )
            .buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0]),
        )?;
        let objects_total = prometheus::Counter::with_opts(Opts::new(
            "redecor_detected_objects_total",
            "Inventory items created from detections",
        ))?;
        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(attempts.clone()))?;
        registry.register(Box::new(objects_total.clone()))?;
        Ok(Self {
            requests_total,
            attempts,
            objects_total,
        })
    }
}

#[async_trait]
impl DetectionMetrics for PrometheusDetectionMetrics {
    async fn record(&self, outcome: &DetectionOutcome) -> Result<(), DetectionMetricsError> {
        self.requests_total
            .with_label_values(&[outcome.kind.as_label()])
            .inc();
        self.attempts.observe(f64::from(outcome.attempt_count));
        #[expect(
            clippy::cast_precision_loss,
            reason = "object counts per image are tiny"
        )]
        let objects = outcome.object_count as f64;
        self.objects_total.inc_by(objects);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::DetectionOutcomeKind;

    #[test]
    fn registers_metrics_with_registry() {
        let registry = Registry::new();
        let metrics =
            PrometheusDetectionMetrics::new(&registry).expect("metric registration should succeed");
        metrics.requests_total.with_label_values(&["rejected"]).inc();

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.name().to_owned())
            .collect();
        assert!(names.contains(&"redecor_detection_requests_total".to_owned()));
    }

    #[test]
    fn registering_twice_fails() {
        let registry = Registry::new();
        PrometheusDetectionMetrics::new(&registry).expect("first registration");
        assert!(PrometheusDetectionMetrics::new(&registry).is_err());
    }

    #[tokio::test]
    async fn record_counts_outcome_attempts_and_objects() {
        let registry = Registry::new();
        let metrics =
            PrometheusDetectionMetrics::new(&registry).expect("metric registration should succeed");

        metrics
            .record(&DetectionOutcome {
                kind: DetectionOutcomeKind::Succeeded,
                attempt_count: 2,
                object_count: 3,
            })
            .await
            .expect("recording should succeed");

        let counter = metrics.requests_total.with_label_values(&["succeeded"]);
        assert_eq!(counter.get() as u64, 1);
        assert_eq!(metrics.attempts.get_sample_count(), 1);
        assert_eq!(metrics.objects_total.get() as u64, 3);
    }
}
