//! Per-asset metric derivation.

use collins_client::{AssetRecord, AssetStatus};

use crate::observation::{MetricKind, Observation};

/// Derive the observations for one asset: one status point per known
/// status, one state point, one details point.
pub fn derive(asset: &AssetRecord) -> Vec<Observation> {
    let mut out = Vec::with_capacity(AssetStatus::ALL.len() + 2);

    for status in AssetStatus::ALL {
        out.push(Observation {
            metric: MetricKind::AssetStatus,
            labels: vec![
                ("tag", asset.tag.clone()),
                ("status", status.as_str().to_string()),
            ],
            value: if asset.status == status { 1.0 } else { 0.0 },
        });
    }

    out.push(Observation {
        metric: MetricKind::AssetState,
        labels: vec![("tag", asset.tag.clone())],
        value: asset.state as f64,
    });

    out.push(Observation {
        metric: MetricKind::AssetDetails,
        labels: vec![
            ("tag", asset.tag.clone()),
            ("nodeclass", asset.nodeclass.clone()),
            ("ipmi_address", asset.ipmi_address.clone()),
            ("primary_address", asset.primary_address().to_string()),
        ],
        value: 1.0,
    });

    out
}

/// Derive observations for every asset, preserving asset order.
pub fn derive_all(assets: &[AssetRecord]) -> Vec<Observation> {
    assets.iter().flat_map(derive).collect()
}
