//! Lighting power density unit conversion.

use serde::{Deserialize, Serialize};

/// Square feet per square metre.
pub const FT2_PER_M2: f64 = 10.763_910_416_709_722;

/// Units of the standards dataset wattage columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetUnits {
    /// W/ft² and W/ft
    #[default]
    Ip,
    /// W/m² and W/m
    Si,
}

/// Converts a lighting power density in dataset units to W/m².
pub fn lpd_to_si(value: f64, units: DatasetUnits) -> f64 {
    match units {
        DatasetUnits::Ip => value * FT2_PER_M2,
        DatasetUnits::Si => value,
    }
}
