//! Scrape coordinator — coalesces concurrent scrape requests into at most
//! one in-flight Collins fetch.
//!
//! A single background task owns the backend client and
//! the scrape counters. Callers send it a request carrying a oneshot reply
//! slot. When the task is idle, a request starts a fetch. Requests that
//! queue up while the fetch runs are all answered with that fetch's result
//! once it completes, so every concurrent caller sees the same
//! `Arc<ScrapeResult>`. The request queue is unbounded: a caller never waits
//! to enqueue, so no burst can spill past the drain into a second fetch.
//!
//! ```text
//! request() ──┐
//! request() ──┼─► mpsc ─► task: Idle ─recv─► Fetching ─► reply + drain ─► Idle
//! request() ──┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use collins_client::AssetFinder;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::derive::derive_all;
use crate::fetcher::{fetch_all, FetchOptions};
use crate::observation::Observation;

/// Outcome of one coordinator cycle. Shared, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeResult {
    /// Asset observations; empty when the fetch failed.
    pub observations: Vec<Observation>,
    pub success: bool,
    /// Wall time of the fetch.
    pub duration: Duration,
    /// When the fetch finished.
    pub timestamp: SystemTime,
    /// Assets behind `observations`.
    pub asset_count: usize,
    /// Fetches attempted so far, including this one.
    pub scrapes_total: u64,
    /// Failed fetches so far, including this one.
    pub failures_total: u64,
}

/// Errors returned to callers of [`ScrapeCoordinator::request`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("scrape coordinator is not running")]
    Closed,
}

type Reply = oneshot::Sender<Arc<ScrapeResult>>;

/// Handle to the coordinator task. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ScrapeCoordinator {
    requests: mpsc::UnboundedSender<Reply>,
}

impl ScrapeCoordinator {
    /// Spawn the coordinator task on the current runtime.
    ///
    /// The task runs until `shutdown` flips (or its sender is dropped), or
    /// until every handle has been dropped.
    pub fn spawn<F>(
        finder: F,
        options: FetchOptions,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, JoinHandle<()>)
    where
        F: AssetFinder + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = CoordinatorTask {
            finder,
            options,
            requests: rx,
            scrapes_total: 0,
            failures_total: 0,
        };
        let handle = tokio::spawn(task.run(shutdown));
        (Self { requests: tx }, handle)
    }

    /// Get the result of the current (or a fresh) fetch.
    ///
    /// Blocks until the fetch completes; there is no internal timeout.
    pub async fn request(&self) -> Result<Arc<ScrapeResult>, CoordinatorError> {
        let (reply, result) = oneshot::channel();
        self.requests
            .send(reply)
            .map_err(|_| CoordinatorError::Closed)?;
        result.await.map_err(|_| CoordinatorError::Closed)
    }
}

/// State owned exclusively by the coordinator task.
struct CoordinatorTask<F> {
    finder: F,
    options: FetchOptions,
    requests: mpsc::UnboundedReceiver<Reply>,
    scrapes_total: u64,
    failures_total: u64,
}

impl<F: AssetFinder> CoordinatorTask<F> {
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            query = %self.options.query,
            page_size = self.options.page_size,
            "scrape coordinator started"
        );

        loop {
            tokio::select! {
                request = self.requests.recv() => {
                    let Some(first) = request else {
                        debug!("all coordinator handles dropped");
                        break;
                    };
                    let result = tokio::select! {
                        result = self.scrape() => result,
                        _ = shutdown.changed() => {
                            info!("scrape coordinator shutting down mid-scrape");
                            break;
                        }
                    };
                    serve(first, &result);
                    self.serve_pending(&result);
                }
                _ = shutdown.changed() => {
                    info!("scrape coordinator shutting down");
                    break;
                }
            }
        }
    }

    /// Run one fetch and build a fresh result from it.
    async fn scrape(&mut self) -> Arc<ScrapeResult> {
        debug!("starting collins scrape");
        let start = Instant::now();
        let fetched = fetch_all(&self.finder, &self.options).await;
        let took = start.elapsed();

        self.scrapes_total += 1;
        let result = match fetched {
            Ok(assets) => {
                info!(assets = assets.len(), took_ms = took.as_millis() as u64, "collins scrape finished");
                ScrapeResult {
                    observations: derive_all(&assets),
                    success: true,
                    duration: took,
                    timestamp: SystemTime::now(),
                    asset_count: assets.len(),
                    scrapes_total: self.scrapes_total,
                    failures_total: self.failures_total,
                }
            }
            Err(e) => {
                // Partial pages are never published.
                self.failures_total += 1;
                warn!(
                    error = %e,
                    discarded = e.partial().len(),
                    took_ms = took.as_millis() as u64,
                    "collins scrape failed"
                );
                ScrapeResult {
                    observations: Vec::new(),
                    success: false,
                    duration: took,
                    timestamp: SystemTime::now(),
                    asset_count: 0,
                    scrapes_total: self.scrapes_total,
                    failures_total: self.failures_total,
                }
            }
        };
        Arc::new(result)
    }

    /// Answer every request that queued up during the fetch.
    fn serve_pending(&mut self, result: &Arc<ScrapeResult>) {
        let mut served = 0usize;
        while let Ok(reply) = self.requests.try_recv() {
            serve(reply, result);
            served += 1;
        }
        if served > 0 {
            debug!(served, "coalesced waiting scrape requests");
        }
    }
}

fn serve(reply: Reply, result: &Arc<ScrapeResult>) {
    if reply.send(Arc::clone(result)).is_err() {
        debug!("scrape requester went away before the result was ready");
    }
}
