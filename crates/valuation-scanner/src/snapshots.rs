use std::path::Path;

use analysis_core::FundamentalSnapshot;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One entry of the fetch job's output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub symbol: String,
    pub snapshot: FundamentalSnapshot,
}

pub async fn load_snapshots(path: &Path) -> Result<Vec<SnapshotEntry>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
    parse_snapshots(&raw).with_context(|| format!("Malformed snapshot file {}", path.display()))
}

pub fn parse_snapshots(raw: &str) -> Result<Vec<SnapshotEntry>> {
    let entries: Vec<SnapshotEntry> = serde_json::from_str(raw)?;
    Ok(entries)
}

/// US listings only: bare tickers, or an explicit `.US` suffix.
pub fn is_supported_symbol(symbol: &str) -> bool {
    let symbol = symbol.trim();
    !symbol.is_empty()
        && (!symbol.contains('.') || symbol.to_ascii_uppercase().ends_with(".US"))
}
