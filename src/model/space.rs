//! Spaces, space types and their lighting objects.

use serde::{Deserialize, Serialize};

use super::{LightsDefinitionId, LightsId, ScheduleId, SpaceTypeId};
use crate::error::{LightingError, LightingResult};

/// A physical room or zone instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub name: String,
    /// Floor area (m²)
    pub floor_area: f64,
    /// Volume (m³)
    pub volume: f64,
    /// Template this space currently draws its loads from.
    pub space_type: Option<SpaceTypeId>,
}

impl Space {
    pub fn new(name: impl Into<String>, floor_area: f64, volume: f64) -> Self {
        Self {
            name: name.into(),
            floor_area,
            volume,
            space_type: None,
        }
    }

    pub fn with_space_type(mut self, space_type: SpaceTypeId) -> Self {
        self.space_type = Some(space_type);
        self
    }

    /// Average ceiling height, `volume / floor_area`.
    ///
    /// Fails when the floor area is not strictly positive.
    pub fn height(&self) -> LightingResult<f64> {
        if self.floor_area.is_nan() || self.floor_area <= 0.0 || !self.volume.is_finite() {
            return Err(LightingError::Geometry {
                space: self.name.clone(),
                floor_area: self.floor_area,
            });
        }
        Ok(self.volume / self.floor_area)
    }
}

/// A reusable load template shared by many spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceType {
    pub name: String,
    /// Standards category used when no user override applies.
    #[serde(default)]
    pub standards_space_type: Option<String>,
    /// Owned lighting instances, in iteration order.
    #[serde(default)]
    pub lights: Vec<LightsId>,
}

impl SpaceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            standards_space_type: None,
            lights: Vec::new(),
        }
    }

    pub fn with_standards_space_type(mut self, standards_space_type: impl Into<String>) -> Self {
        self.standards_space_type = Some(standards_space_type.into());
        self
    }
}

/// A lighting load instance owned by a space type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lights {
    pub name: String,
    pub definition: LightsDefinitionId,
    #[serde(default)]
    pub schedule: Option<ScheduleId>,
}

impl Lights {
    pub fn new(name: impl Into<String>, definition: LightsDefinitionId) -> Self {
        Self {
            name: name.into(),
            definition,
            schedule: None,
        }
    }

    pub fn with_schedule(mut self, schedule: ScheduleId) -> Self {
        self.schedule = Some(schedule);
        self
    }
}

/// Per-area lighting wattage, shared by reference between instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightsDefinition {
    pub name: String,
    /// Lighting power density (W/m²)
    pub watts_per_space_floor_area: f64,
}

impl LightsDefinition {
    pub fn new(name: impl Into<String>, watts_per_space_floor_area: f64) -> Self {
        Self {
            name: name.into(),
            watts_per_space_floor_area,
        }
    }
}
