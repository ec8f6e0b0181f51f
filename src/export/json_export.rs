//! JSON snapshot export of the network observables.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::network::NetworkMetrics;

/// Full snapshot export structure
#[derive(Debug, Clone, Serialize)]
pub struct MetricsExport {
    /// Export timestamp
    pub exported_at: String,
    /// Export version for compatibility
    pub version: &'static str,
    /// Network observables snapshot
    pub metrics: NetworkMetrics,
}

/// Export the current network observables to JSON.
///
/// Creates the exports directory if it doesn't exist; the filename is
/// auto-generated with a timestamp: `metrics_YYYYMMDD_HHMMSS.json`.
///
/// Returns the path to the saved file.
pub fn export_metrics_json(metrics: &NetworkMetrics) -> Result<PathBuf> {
    let dir = PathBuf::from("exports");
    std::fs::create_dir_all(&dir)?;

    let timestamp = Local::now();
    let filename = format!("metrics_{}.json", timestamp.format("%Y%m%d_%H%M%S"));
    let path = dir.join(&filename);

    write_snapshot(metrics, &path)?;
    Ok(path)
}

/// Export the observables to a specific file
pub fn export_metrics_json_to<P: AsRef<Path>>(metrics: &NetworkMetrics, path: P) -> Result<()> {
    write_snapshot(metrics, path.as_ref())
}

fn write_snapshot(metrics: &NetworkMetrics, path: &Path) -> Result<()> {
    let export = MetricsExport {
        exported_at: Local::now().to_rfc3339(),
        version: "1.0.0",
        metrics: metrics.clone(),
    };

    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &export)?;

    log::info!("JSON metrics exported: {}", path.display());
    Ok(())
}
