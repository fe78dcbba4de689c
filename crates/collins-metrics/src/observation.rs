//! Metric identities and observation points.

use std::fmt;

/// Namespace prefix for every exported metric.
pub const NAMESPACE: &str = "collins";

/// Prometheus metric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
    Counter,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricType::Gauge => f.write_str("gauge"),
            MetricType::Counter => f.write_str("counter"),
        }
    }
}

/// Every metric family the exporter emits.
///
/// Names and label sets are a compatibility contract with dashboards and
/// alerts; changing them is a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    AssetStatus,
    AssetState,
    AssetDetails,
    Up,
    ScrapeDurationSeconds,
    ScrapesTotal,
    ScrapeFailuresTotal,
}

impl MetricKind {
    /// All families, in exposition order.
    pub const ALL: [MetricKind; 7] = [
        MetricKind::AssetStatus,
        MetricKind::AssetState,
        MetricKind::AssetDetails,
        MetricKind::Up,
        MetricKind::ScrapeDurationSeconds,
        MetricKind::ScrapesTotal,
        MetricKind::ScrapeFailuresTotal,
    ];

    /// Fully-qualified metric name.
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::AssetStatus => "collins_asset_status",
            MetricKind::AssetState => "collins_asset_state",
            MetricKind::AssetDetails => "collins_asset_details",
            MetricKind::Up => "collins_up",
            MetricKind::ScrapeDurationSeconds => "collins_scrape_duration_seconds",
            MetricKind::ScrapesTotal => "collins_scrapes_total",
            MetricKind::ScrapeFailuresTotal => "collins_scrape_failures_total",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            MetricKind::AssetStatus => {
                "'1' if the asset with the given tag has the given Collins status, '0' otherwise."
            }
            MetricKind::AssetState => "The numerical Collins state ID for the asset with the given tag.",
            MetricKind::AssetDetails => {
                "Constant metric with value '1' providing details for the asset with the given tag as labels."
            }
            MetricKind::Up => "'1' if the last scrape of Collins was successful, '0' otherwise.",
            MetricKind::ScrapeDurationSeconds => "The duration it took to scrape Collins.",
            MetricKind::ScrapesTotal => "Total number of Collins scrapes.",
            MetricKind::ScrapeFailuresTotal => "Total number of failures scraping Collins.",
        }
    }

    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricKind::ScrapesTotal | MetricKind::ScrapeFailuresTotal => MetricType::Counter,
            _ => MetricType::Gauge,
        }
    }

    /// Label names, in emission order.
    pub fn label_names(&self) -> &'static [&'static str] {
        match self {
            MetricKind::AssetStatus => &["tag", "status"],
            MetricKind::AssetState => &["tag"],
            MetricKind::AssetDetails => &["tag", "nodeclass", "ipmi_address", "primary_address"],
            MetricKind::Up
            | MetricKind::ScrapeDurationSeconds
            | MetricKind::ScrapesTotal
            | MetricKind::ScrapeFailuresTotal => &[],
        }
    }
}

/// A single metric point.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub metric: MetricKind,
    /// Label name → value, in the order of `metric.label_names()`.
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

impl Observation {
    /// An observation with no labels.
    pub fn unlabeled(metric: MetricKind, value: f64) -> Self {
        Self {
            metric,
            labels: Vec::new(),
            value,
        }
    }

    /// Look up a label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_namespaced() {
        for kind in MetricKind::ALL {
            assert!(kind.name().starts_with(NAMESPACE), "{}", kind.name());
        }
    }

    #[test]
    fn counters_are_the_totals() {
        let counters: Vec<_> = MetricKind::ALL
            .into_iter()
            .filter(|k| k.metric_type() == MetricType::Counter)
            .collect();
        assert_eq!(
            counters,
            vec![MetricKind::ScrapesTotal, MetricKind::ScrapeFailuresTotal]
        );
    }

    #[test]
    fn label_lookup() {
        let obs = Observation {
            metric: MetricKind::AssetState,
            labels: vec![("tag", "T1".to_string())],
            value: 3.0,
        };
        assert_eq!(obs.label("tag"), Some("T1"));
        assert_eq!(obs.label("status"), None);
        assert!(Observation::unlabeled(MetricKind::Up, 1.0).labels.is_empty());
    }
}
