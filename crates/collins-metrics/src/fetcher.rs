//! Paginated retrieval of every asset matching the exporter's query.

use collins_client::{AssetFinder, AssetRecord, ClientError};
use thiserror::Error;
use tracing::{debug, error};

/// Query used when none is configured.
pub const DEFAULT_QUERY: &str = "TYPE = SERVER_NODE AND NOT STATUS = incomplete";

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// What to ask Collins for on each scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// CQL filter.
    pub query: String,
    pub page_size: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A failed fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The first page could not be retrieved.
    #[error("collins unavailable: {0}")]
    BackendUnavailable(#[source] ClientError),

    /// A later page failed; the records from earlier pages are kept.
    #[error("page {page} failed after {} assets were retrieved: {source}", .partial.len())]
    MidPagination {
        page: u32,
        partial: Vec<AssetRecord>,
        #[source]
        source: ClientError,
    },
}

impl FetchError {
    /// Records retrieved before the failure.
    pub fn partial(&self) -> &[AssetRecord] {
        match self {
            FetchError::BackendUnavailable(_) => &[],
            FetchError::MidPagination { partial, .. } => partial,
        }
    }

    pub fn into_partial(self) -> Vec<AssetRecord> {
        match self {
            FetchError::BackendUnavailable(_) => Vec::new(),
            FetchError::MidPagination { partial, .. } => partial,
        }
    }
}

/// Fetch every page, starting at page 0, until the backend stops advancing
/// the next-page indicator.
pub async fn fetch_all<F: AssetFinder>(
    finder: &F,
    options: &FetchOptions,
) -> Result<Vec<AssetRecord>, FetchError> {
    let mut page = 0;
    let first = finder
        .find(&options.query, page, options.page_size)
        .await
        .map_err(|e| {
            error!(error = %e, "asset find failed");
            FetchError::BackendUnavailable(e)
        })?;
    debug!(
        found = first.assets.len(),
        total = first.pagination.total_results,
        "found assets"
    );

    let capacity = usize::try_from(first.pagination.total_results)
        .unwrap_or(first.assets.len())
        .max(first.assets.len());
    let mut all = Vec::with_capacity(capacity);
    all.extend(first.assets);

    let mut pagination = first.pagination;
    while pagination.has_next() {
        page += 1;
        match finder.find(&options.query, page, options.page_size).await {
            Ok(next) => {
                debug!(page, found = next.assets.len(), "found more assets");
                all.extend(next.assets);
                pagination = next.pagination;
            }
            Err(e) => {
                error!(page, error = %e, retrieved = all.len(), "asset find failed mid-pagination");
                return Err(FetchError::MidPagination {
                    page,
                    partial: all,
                    source: e,
                });
            }
        }
    }

    Ok(all)
}
