use serde::{Deserialize, Serialize};

use crate::scoring::SessionWeights;

/// On-disk form of a saved weight session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedWeights {
    pub version: u32,
    pub weights: SessionWeights,
}

impl SavedWeights {
    pub fn new(weights: SessionWeights) -> Self {
        Self {
            version: 1,
            weights,
        }
    }
}
