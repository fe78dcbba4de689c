//! Asset model for the Collins inventory.
//!
//! The public types (`AssetRecord`, `AssetStatus`, `Pagination`) are what the
//! rest of the workspace works with. The `Wire*` types mirror the JSON the
//! Collins `/api/assets` endpoint returns and are converted at the edge.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ClientError, ClientResult};

// ── Asset ─────────────────────────────────────────────────────────

/// Lifecycle status of a Collins asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetStatus {
    /// Powered on and entered in Collins, burn-in likely still running.
    Incomplete,
    /// Burn-in done, waiting for physical intake.
    New,
    /// Intake done, ready for use.
    Unallocated,
    /// Provisioning started but not finished.
    Provisioning,
    /// Provisioned, awaiting final automated verification.
    Provisioned,
    /// In production.
    Allocated,
    /// No longer needed, awaiting decommissioning.
    Cancelled,
    /// Outtake complete, can no longer be managed.
    Decommissioned,
    /// Under maintenance, not for production use.
    Maintenance,
}

impl AssetStatus {
    /// Every status, in the order metrics are emitted.
    pub const ALL: [AssetStatus; 9] = [
        AssetStatus::Incomplete,
        AssetStatus::New,
        AssetStatus::Unallocated,
        AssetStatus::Provisioning,
        AssetStatus::Provisioned,
        AssetStatus::Allocated,
        AssetStatus::Cancelled,
        AssetStatus::Decommissioned,
        AssetStatus::Maintenance,
    ];

    /// Display name as used by Collins.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Incomplete => "Incomplete",
            AssetStatus::New => "New",
            AssetStatus::Unallocated => "Unallocated",
            AssetStatus::Provisioning => "Provisioning",
            AssetStatus::Provisioned => "Provisioned",
            AssetStatus::Allocated => "Allocated",
            AssetStatus::Cancelled => "Cancelled",
            AssetStatus::Decommissioned => "Decommissioned",
            AssetStatus::Maintenance => "Maintenance",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::UnknownStatus(s.to_string()))
    }
}

/// One inventory-managed unit, as fetched from Collins.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    /// Unique asset tag.
    pub tag: String,
    pub status: AssetStatus,
    /// User-defined numeric state ID (0 if the asset has no state).
    pub state: u64,
    /// Classification tag; empty when unclassified.
    pub nodeclass: String,
    /// IPMI address; empty when unknown.
    pub ipmi_address: String,
    /// Network addresses in the order Collins lists them.
    pub addresses: Vec<String>,
}

impl AssetRecord {
    /// First listed address, or the empty string.
    pub fn primary_address(&self) -> &str {
        self.addresses.first().map(String::as_str).unwrap_or("")
    }
}

// ── Pagination ────────────────────────────────────────────────────

/// Page bookkeeping returned with every find call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pagination {
    #[serde(default)]
    pub previous_page: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub next_page: u32,
    #[serde(default)]
    pub total_results: u64,
}

impl Pagination {
    /// Whether the backend reports a page after this one.
    pub fn has_next(&self) -> bool {
        self.next_page > self.current_page
    }
}

/// One page of find results.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPage {
    pub assets: Vec<AssetRecord>,
    pub pagination: Pagination,
}

// ── Wire format ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct WireFindResponse {
    pub data: WireFindData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireFindData {
    #[serde(rename = "Pagination", default)]
    pub pagination: Pagination,
    #[serde(rename = "Data", default)]
    pub assets: Vec<WireAsset>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireErrorResponse {
    pub data: WireErrorData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireErrorData {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAsset {
    #[serde(rename = "ASSET")]
    pub metadata: WireMetadata,
    #[serde(rename = "CLASSIFICATION", default)]
    pub classification: Option<WireClassification>,
    #[serde(rename = "IPMI", default)]
    pub ipmi: Option<WireIpmi>,
    #[serde(rename = "ADDRESSES", default)]
    pub addresses: Option<Vec<WireAddress>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMetadata {
    #[serde(rename = "TAG")]
    pub tag: String,
    #[serde(rename = "STATUS")]
    pub status: String,
    #[serde(rename = "STATE", default)]
    pub state: Option<WireState>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireState {
    #[serde(rename = "ID", default)]
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireClassification {
    #[serde(rename = "TAG", default)]
    pub tag: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireIpmi {
    #[serde(rename = "IPMI_ADDRESS", default)]
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAddress {
    #[serde(rename = "ADDRESS", default)]
    pub address: String,
}

impl TryFrom<WireAsset> for AssetRecord {
    type Error = ClientError;

    fn try_from(wire: WireAsset) -> ClientResult<Self> {
        Ok(AssetRecord {
            status: wire.metadata.status.parse()?,
            tag: wire.metadata.tag,
            state: wire.metadata.state.map(|s| s.id).unwrap_or(0),
            nodeclass: wire.classification.map(|c| c.tag).unwrap_or_default(),
            ipmi_address: wire.ipmi.map(|i| i.address).unwrap_or_default(),
            addresses: wire
                .addresses
                .unwrap_or_default()
                .into_iter()
                .map(|a| a.address)
                .collect(),
        })
    }
}

/// Decode an `/api/assets` response body into a page of records.
pub(crate) fn decode_find_response(body: &[u8]) -> ClientResult<AssetPage> {
    let response: WireFindResponse = serde_json::from_slice(body)?;
    let assets = response
        .data
        .assets
        .into_iter()
        .map(AssetRecord::try_from)
        .collect::<ClientResult<Vec<_>>>()?;
    Ok(AssetPage {
        assets,
        pagination: response.data.pagination,
    })
}

/// Best-effort extraction of the message from a Collins error body.
pub(crate) fn decode_error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<WireErrorResponse>(body) {
        Ok(err) => err.data.message,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}
