//! Standards lookup data for interior lighting.
//!
//! - [`StandardsLookup`]: keyed read-only access to per-sub-category records
//! - [`StandardsDataset`]: JSON-backed implementation
//! - [`overrides`]: user override tables keyed by space or space type name

pub mod overrides;

pub use overrides::{OverrideEntry, OverrideTables, UserOverrideRecord};

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{LightingError, LightingResult};

/// How lighting in a sub-category is switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OccupancyControlMode {
    /// Manual-on or partial-auto-on occupancy sensors.
    ManualOnOrPartialAuto,
    /// Any other control, including full auto-on.
    #[default]
    AutoOn,
}

/// One row of the interior lighting table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardsRecord {
    #[serde(rename = "space_type")]
    pub sub_category: String,
    /// Lighting power per floor area (W/ft² or W/m², per dataset units)
    #[serde(rename = "w/ft^2", default, deserialize_with = "lenient_f64")]
    pub watts_per_area: f64,
    /// Lighting power per unit of space height (W/ft or W/m)
    #[serde(rename = "w/ft", default, deserialize_with = "lenient_f64")]
    pub watts_per_length: f64,
    #[serde(rename = "manon_or_partauto", default, deserialize_with = "control_mode")]
    pub occupancy_control_mode: OccupancyControlMode,
    #[serde(rename = "occup_sensor_savings", default, deserialize_with = "lenient_f64")]
    pub occupancy_sensor_savings: f64,
    #[serde(rename = "occup_sensor_auto_on_svgs", default, deserialize_with = "lenient_f64")]
    pub occupancy_sensor_auto_on_savings: f64,
}

impl StandardsRecord {
    pub fn new(sub_category: impl Into<String>, watts_per_area: f64, watts_per_length: f64) -> Self {
        Self {
            sub_category: sub_category.into(),
            watts_per_area,
            watts_per_length,
            occupancy_control_mode: OccupancyControlMode::default(),
            occupancy_sensor_savings: 0.0,
            occupancy_sensor_auto_on_savings: 0.0,
        }
    }

    pub fn with_sensor_savings(
        mut self,
        mode: OccupancyControlMode,
        occupancy_sensor_savings: f64,
        occupancy_sensor_auto_on_savings: f64,
    ) -> Self {
        self.occupancy_control_mode = mode;
        self.occupancy_sensor_savings = occupancy_sensor_savings;
        self.occupancy_sensor_auto_on_savings = occupancy_sensor_auto_on_savings;
        self
    }

    /// Savings rate applicable to this row's control mode.
    pub fn sensor_savings_rate(&self) -> f64 {
        match self.occupancy_control_mode {
            OccupancyControlMode::ManualOnOrPartialAuto => self.occupancy_sensor_savings,
            OccupancyControlMode::AutoOn => self.occupancy_sensor_auto_on_savings,
        }
    }

    /// True unless both wattage fields are zero.
    pub fn is_informative(&self) -> bool {
        !(self.watts_per_area == 0.0 && self.watts_per_length == 0.0)
    }

    /// Lighting power density for a space of the given height.
    pub fn lighting_power_density(&self, height: f64) -> f64 {
        if !self.is_informative() {
            return 0.0;
        }
        self.watts_per_length * height + self.watts_per_area
    }
}

/// Keyed read-only access to standards records.
pub trait StandardsLookup {
    /// Returns the record for `sub_category`.
    ///
    /// * `Err(LightingError::NotFound)` - the sub-category is absent
    fn lookup(&self, sub_category: &str) -> LightingResult<&StandardsRecord>;
}

#[derive(Deserialize)]
struct DatasetDocument {
    #[serde(default)]
    prm_interior_lighting: Vec<StandardsRecord>,
}

/// In-memory interior lighting table.
#[derive(Debug, Clone, Default)]
pub struct StandardsDataset {
    records: HashMap<String, StandardsRecord>,
}

impl StandardsDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = StandardsRecord>) -> Self {
        let mut dataset = Self::new();
        for record in records {
            dataset.insert(record);
        }
        dataset
    }

    /// Parses `{"prm_interior_lighting": [...]}`.
    pub fn from_json_str(json: &str) -> LightingResult<Self> {
        let document: DatasetDocument = serde_json::from_str(json)?;
        Ok(Self::from_records(document.prm_interior_lighting))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> LightingResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Inserts a record, replacing any row with the same sub-category.
    pub fn insert(&mut self, record: StandardsRecord) {
        self.records.insert(record.sub_category.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StandardsLookup for StandardsDataset {
    fn lookup(&self, sub_category: &str) -> LightingResult<&StandardsRecord> {
        self.records
            .get(sub_category)
            .ok_or_else(|| LightingError::NotFound {
                sub_category: sub_category.to_string(),
            })
    }
}

/// Reads a number from a JSON number or numeric string.
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64).unwrap_or(0.0))
}

fn control_mode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OccupancyControlMode, D::Error> {
    let flag = lenient_f64(deserializer)?;
    Ok(if flag as i64 == 1 {
        OccupancyControlMode::ManualOnOrPartialAuto
    } else {
        OccupancyControlMode::AutoOn
    })
}
