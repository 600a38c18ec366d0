use super::types::SavedWeights;
use crate::scoring::SessionWeights;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Get the default saved-weights path (~/.config/district-risk/weights.json)
pub fn get_weights_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join("weights.json"))
}

/// Load saved weights from a JSON file
///
/// If the file doesn't exist, returns `None`.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_weights(path: &Path) -> Result<Option<SessionWeights>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open weights file at {}", path.display()))?;

    let saved: SavedWeights = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load weights from {}", path.display()))?;

    if saved.version != 1 {
        anyhow::bail!("Unsupported weights file version: {}", saved.version);
    }

    Ok(Some(saved.weights))
}

/// Save weights to a JSON file atomically
///
/// Creates the parent directory if it doesn't exist.
pub fn save_weights(path: &Path, weights: &SessionWeights) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, &SavedWeights::new(weights.clone()))
        .context("Failed to serialize weights")?;

    file.commit().context("Failed to save weights")?;

    log::info!("Saved weights to {}", path.display());
    Ok(())
}
