//! Collector facade — one call per external metrics request.

use crate::coordinator::{CoordinatorError, ScrapeCoordinator, ScrapeResult};
use crate::observation::{MetricKind, Observation};

/// Turns a coordinator result into the full observation set for one
/// metrics request. Holds no state of its own.
#[derive(Debug, Clone)]
pub struct Collector {
    coordinator: ScrapeCoordinator,
}

impl Collector {
    pub fn new(coordinator: ScrapeCoordinator) -> Self {
        Self { coordinator }
    }

    /// Metric families this collector can emit.
    pub fn describe(&self) -> &'static [MetricKind] {
        &MetricKind::ALL
    }

    /// Asset observations from the current scrape, followed by `up`,
    /// duration and the two scrape counters.
    pub async fn collect(&self) -> Result<Vec<Observation>, CoordinatorError> {
        let result = self.coordinator.request().await?;
        let mut out = Vec::with_capacity(result.observations.len() + 4);
        out.extend(result.observations.iter().cloned());
        out.extend(process_observations(&result));
        Ok(out)
    }
}

fn process_observations(result: &ScrapeResult) -> [Observation; 4] {
    [
        Observation::unlabeled(MetricKind::Up, if result.success { 1.0 } else { 0.0 }),
        Observation::unlabeled(MetricKind::ScrapeDurationSeconds, result.duration.as_secs_f64()),
        Observation::unlabeled(MetricKind::ScrapesTotal, result.scrapes_total as f64),
        Observation::unlabeled(MetricKind::ScrapeFailuresTotal, result.failures_total as f64),
    ]
}
