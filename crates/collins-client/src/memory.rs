//! In-memory asset finder.
//!
//! Pages a fixed list of assets the way Collins does. Used by tests across
//! the workspace.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::AssetFinder;
use crate::error::{ClientError, ClientResult};
use crate::types::{AssetPage, AssetRecord, Pagination};

/// A cloneable in-memory backend. Clones share call counters and failure
/// injection, so a test can keep one handle and hand another to the code
/// under test.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFinder {
    assets: Arc<Vec<AssetRecord>>,
    calls: Arc<AtomicUsize>,
    fail_on_page: Arc<Mutex<Option<u32>>>,
    delay: Duration,
}

impl InMemoryFinder {
    pub fn new(assets: Vec<AssetRecord>) -> Self {
        Self {
            assets: Arc::new(assets),
            ..Self::default()
        }
    }

    /// Sleep this long inside every `find` call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make every call for `page` fail with a 503 until cleared.
    pub fn fail_on_page(&self, page: Option<u32>) {
        if let Ok(mut slot) = self.fail_on_page.lock() {
            *slot = page;
        }
    }

    /// Number of `find` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of pages a full fetch takes at `page_size`.
    pub fn pages(&self, page_size: u32) -> usize {
        let size = page_size.max(1) as usize;
        self.assets.len().div_ceil(size).max(1)
    }
}

impl AssetFinder for InMemoryFinder {
    async fn find(&self, _query: &str, page: u32, page_size: u32) -> ClientResult<AssetPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failing = self.fail_on_page.lock().map(|slot| *slot).unwrap_or(None);
        if failing == Some(page) {
            return Err(ClientError::Status {
                status: 503,
                message: format!("page {page} unavailable"),
            });
        }

        let size = page_size.max(1) as usize;
        let start = (page as usize).saturating_mul(size).min(self.assets.len());
        let end = start.saturating_add(size).min(self.assets.len());
        let has_more = end < self.assets.len();

        Ok(AssetPage {
            assets: self.assets[start..end].to_vec(),
            pagination: Pagination {
                previous_page: page.saturating_sub(1),
                current_page: page,
                next_page: if has_more { page + 1 } else { page },
                total_results: self.assets.len() as u64,
            },
        })
    }
}
