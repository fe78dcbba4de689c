//! collins-client — asset model and API client for the Collins inventory.
//!
//! # Architecture
//!
//! ```text
//! AssetFinder (trait)        find(query, page, page_size) → AssetPage
//!   ├── CollinsClient        GET /api/assets over HTTP/1.1 + Basic auth
//!   └── InMemoryFinder       fixed asset list, for tests
//!
//! CollinsConfig              collins.toml credentials + discovery
//! ```
//!
//! Responses are decoded from the Collins JSON wire format into
//! [`AssetRecord`]s at the edge; nothing outside this crate sees the raw
//! JSON shape.

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod types;

pub use client::{AssetFinder, CollinsClient};
pub use config::CollinsConfig;
pub use error::{ClientError, ClientResult, ConfigError};
pub use memory::InMemoryFinder;
pub use types::{AssetPage, AssetRecord, AssetStatus, Pagination};
