use std::path::Path;

use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

use crate::error::MetricsError;

use super::RunSummary;

/// Writes `summary` as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns an error when the summary cannot be serialized or written.
pub async fn export_json(path: &Path, summary: &RunSummary<'_>) -> Result<(), MetricsError> {
    let write_error = |source: std::io::Error| MetricsError::WriteSummary {
        path: path.display().to_string(),
        source,
    };
    let json = serde_json::to_vec_pretty(summary)
        .map_err(std::io::Error::other)
        .map_err(write_error)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    let file = tokio::fs::File::create(path).await.map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&json).await.map_err(write_error)?;
    writer.write_all(b"\n").await.map_err(write_error)?;
    writer.flush().await.map_err(write_error)?;
    info!("Summary written to {}", path.display());
    Ok(())
}
