pub mod storage;
pub mod types;

pub use storage::{get_weights_path, load_weights, save_weights};
pub use types::SavedWeights;

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::scoring::SessionWeights;

/// Build the starting weights for a session: configured defaults, overlaid
/// with the saved file when one exists.
///
/// An explicit `path` must exist. Saved factors unknown to the config are an
/// error.
pub fn initial_weights(config: &Config, path: Option<&Path>) -> Result<SessionWeights> {
    let mut weights = config.default_weights();

    let saved = match path {
        Some(p) => Some(
            load_weights(p)?
                .with_context(|| format!("Weights file not found at {}", p.display()))?,
        ),
        None => load_weights(&get_weights_path()?)?,
    };

    if let Some(saved) = saved {
        weights
            .apply_saved(&saved, &config.weights)
            .context("Saved weights do not match the configured factors")?;
        log::debug!("Applied saved weights");
    }

    Ok(weights)
}
