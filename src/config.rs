//! Pass configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LightingResult;
use crate::units::DatasetUnits;

/// Which internal loads `apply_internal_loads` may rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFlags {
    #[serde(default = "default_true")]
    pub set_lights: bool,
}

impl LoadFlags {
    pub fn lights() -> Self {
        Self { set_lights: true }
    }

    pub fn none() -> Self {
        Self { set_lights: false }
    }
}

impl Default for LoadFlags {
    fn default() -> Self {
        Self::lights()
    }
}

/// Settings for one resolution pass over a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassConfig {
    /// Units of the standards dataset wattage columns.
    #[serde(default)]
    pub dataset_units: DatasetUnits,
    #[serde(default)]
    pub load_flags: LoadFlags,
    /// Discard each original space type once its spaces hold clones.
    #[serde(default = "default_true")]
    pub remove_unused_space_types: bool,
}

impl PassConfig {
    pub fn from_json_str(json: &str) -> LightingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> LightingResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_dataset_units(mut self, dataset_units: DatasetUnits) -> Self {
        self.dataset_units = dataset_units;
        self
    }
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            dataset_units: DatasetUnits::default(),
            load_flags: LoadFlags::default(),
            remove_unused_space_types: true,
        }
    }
}

fn default_true() -> bool {
    true
}
