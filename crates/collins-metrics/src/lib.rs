//! collins-metrics — turns the Collins inventory into Prometheus metrics.
//!
//! Fetches every asset page by page, derives per-asset status, state and
//! details metrics, and coalesces concurrent scrapes so Collins sees at most
//! one fetch at a time no matter how often the exporter is scraped.
//!
//! # Architecture
//!
//! ```text
//! Collector::collect()           ← called per /metrics request
//!   └── ScrapeCoordinator        one task, at most one fetch in flight
//!         ├── fetch_all()        paginated AssetFinder calls
//!         └── derive_all()       AssetRecord → Observation
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics endpoint
//! ```

pub mod collector;
pub mod coordinator;
pub mod derive;
pub mod fetcher;
pub mod observation;
pub mod prometheus;

pub use collector::Collector;
pub use coordinator::{CoordinatorError, ScrapeCoordinator, ScrapeResult};
pub use derive::{derive, derive_all};
pub use fetcher::{fetch_all, FetchError, FetchOptions};
pub use observation::{MetricKind, MetricType, Observation};
pub use prometheus::render_prometheus;
