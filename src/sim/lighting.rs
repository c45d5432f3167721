//! Lighting power density resolution.
//!
//! Each space's LPD comes from the first source that applies:
//!
//! 1. a user override keyed by the space name
//! 2. a user override keyed by the space type name
//! 3. the standards row for the space type's own standards category
//!
//! Overrides blend several sub-categories by fraction and also yield an
//! occupancy-sensor credit weighted by each entry's share of the LPD.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{LightingError, LightingResult};
use crate::model::{Space, SpaceType};
use crate::standards::{OverrideTables, StandardsLookup, UserOverrideRecord};

/// Which source produced a space's LPD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LpdSource {
    SpaceOverride,
    SpaceTypeOverride,
    Standards,
}

/// Resolved lighting for one space, in dataset units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpaceLighting {
    pub lpd: f64,
    /// Occupancy-sensor credit used to adjust the lighting schedule.
    pub credit: f64,
    pub source: LpdSource,
}

/// Returns true if `name` contains "plenum", ignoring case.
pub fn is_plenum(name: &str) -> bool {
    name.to_lowercase().contains("plenum")
}

/// Returns true if the space type's name or standards category marks it as a plenum.
pub fn space_type_is_plenum(space_type: &SpaceType) -> bool {
    is_plenum(&space_type.name)
        || space_type
            .standards_space_type
            .as_deref()
            .map_or(false, is_plenum)
}

/// Applies override precedence and the weighted blend to spaces.
pub struct LpdResolver<'a> {
    lookup: &'a dyn StandardsLookup,
    overrides: &'a OverrideTables,
}

impl<'a> LpdResolver<'a> {
    pub fn new(lookup: &'a dyn StandardsLookup, overrides: &'a OverrideTables) -> Self {
        Self { lookup, overrides }
    }

    /// Resolves the LPD and occupancy-sensor credit for `space`.
    ///
    /// Returns `Ok(None)` for plenums, which are left untouched.
    ///
    /// # Errors
    ///
    /// * `LightingError::Geometry` - the space has no usable floor area
    /// * `LightingError::DivisionByZero` - an override blend sums to zero LPD
    pub fn resolve_space(
        &self,
        space: &Space,
        space_type: &SpaceType,
    ) -> LightingResult<Option<SpaceLighting>> {
        if space_type_is_plenum(space_type) || is_plenum(&space.name) {
            debug!(space = %space.name, "skipping plenum");
            return Ok(None);
        }

        let height = space.height()?;

        if let Some(record) = self.overrides.for_space(&space.name) {
            let (lpd, credit) = self.blend(record, height)?;
            return Ok(Some(SpaceLighting {
                lpd,
                credit,
                source: LpdSource::SpaceOverride,
            }));
        }

        if let Some(record) = self.overrides.for_space_type(&space_type.name) {
            let (lpd, credit) = self.blend(record, height)?;
            return Ok(Some(SpaceLighting {
                lpd,
                credit,
                source: LpdSource::SpaceTypeOverride,
            }));
        }

        let (lpd, credit) = self.from_standards(space_type, height)?;
        Ok(Some(SpaceLighting {
            lpd,
            credit,
            source: LpdSource::Standards,
        }))
    }

    /// Fraction-weighted LPD and credit for an override record.
    ///
    /// Entries are taken in order while the running fraction total is at
    /// most 1.0; the entry that carries the total past 1.0 is still counted.
    /// The credit weights each rate by `lpd_i * fraction_i`.
    pub fn blend(&self, record: &UserOverrideRecord, height: f64) -> LightingResult<(f64, f64)> {
        let mut lpd = 0.0;
        let mut credit_sum = 0.0;
        let mut fraction_sum = 0.0;

        for entry in &record.entries {
            if fraction_sum > 1.0 {
                break;
            }
            fraction_sum += entry.fraction;

            let Some(sub_category) = entry.sub_category.as_deref() else {
                warn!(record = %record.name, "override entry has no sub-category");
                continue;
            };
            let (contribution, rate) = match self.lookup.lookup(sub_category) {
                Ok(row) => (row.lighting_power_density(height), row.sensor_savings_rate()),
                Err(LightingError::NotFound { .. }) => {
                    warn!(record = %record.name, sub_category, "standards row not found");
                    (0.0, 0.0)
                }
                Err(e) => return Err(e),
            };

            let weighted = contribution * entry.fraction;
            lpd += weighted;
            credit_sum += rate * weighted * entry.fraction;
        }

        if lpd.is_nan() || lpd <= 0.0 {
            return Err(LightingError::DivisionByZero {
                context: format!("override '{}' resolves to non-positive lighting power", record.name),
            });
        }
        Ok((lpd, credit_sum / lpd))
    }

    /// LPD and credit straight from the space type's standards row.
    ///
    /// A missing category yields zero LPD and zero credit.
    pub fn from_standards(&self, space_type: &SpaceType, height: f64) -> LightingResult<(f64, f64)> {
        let Some(category) = space_type.standards_space_type.as_deref() else {
            warn!(space_type = %space_type.name, "no standards space type assigned");
            return Ok((0.0, 0.0));
        };
        match self.lookup.lookup(category) {
            Ok(row) => Ok((row.lighting_power_density(height), row.sensor_savings_rate())),
            Err(LightingError::NotFound { .. }) => {
                warn!(space_type = %space_type.name, category, "standards row not found");
                Ok((0.0, 0.0))
            }
            Err(e) => Err(e),
        }
    }
}
