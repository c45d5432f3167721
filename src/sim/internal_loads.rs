//! Space-type internal lighting loads.
//!
//! [`InternalLoads::apply_internal_loads`] resolves every space of a space
//! type, then gives each space its own copy of the space type carrying the
//! resolved LPD. Space types and lights definitions are shared templates:
//! they are copied before any write so no space sees a sibling's values.
//! [`InternalLoads::adjust_lighting_schedules`] then rewrites each space's
//! lighting schedule using the credit recorded during resolution.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::{LoadFlags, PassConfig};
use crate::error::LightingResult;
use crate::model::{Lights, LightsDefinition, LightsId, Model, SpaceId, SpaceTypeId};
use crate::report::{PassReport, SpaceOutcome};
use crate::sim::lighting::{space_type_is_plenum, LpdResolver};
use crate::sim::occupancy::ScheduleTransformer;
use crate::standards::{OverrideTables, StandardsLookup};
use crate::units::{lpd_to_si, DatasetUnits};

/// Copy-on-write writer of resolved LPDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceMaterializer {
    units: DatasetUnits,
}

impl SpaceMaterializer {
    pub fn new(units: DatasetUnits) -> Self {
        Self { units }
    }

    /// Leaves exactly one lights instance on `space_type`.
    ///
    /// Creates one with a zero-wattage definition when none exist; otherwise
    /// keeps the first and removes the rest.
    pub fn prepare_lights(&self, model: &mut Model, space_type: SpaceTypeId) -> LightingResult<LightsId> {
        let st = model.space_type(space_type)?;
        let name = st.name.clone();
        let instances = st.lights.clone();

        let Some((&kept, extra)) = instances.split_first() else {
            let definition = model.add_lights_definition(LightsDefinition::new(
                format!("{} Lights Definition", name),
                0.0,
            ));
            let lights = model.add_lights(space_type, Lights::new(format!("{} Lights", name), definition))?;
            info!(space_type = %name, "space type had no lights, one has been created");
            return Ok(lights);
        };

        for &lights in extra {
            let removed = model.remove_lights(lights)?;
            info!(space_type = %name, lights = %removed.name, "removed extra lights");
        }
        Ok(kept)
    }

    /// Moves `space` onto a private copy of `space_type` and writes `lpd`
    /// (dataset units) into a private copy of its lights definition.
    ///
    /// A zero `lpd` keeps the template's definition. Returns the copy's id.
    pub fn materialize(
        &self,
        model: &mut Model,
        space: SpaceId,
        space_type: SpaceTypeId,
        lpd: f64,
    ) -> LightingResult<SpaceTypeId> {
        let space_name = model.space(space)?.name.clone();
        let type_name = model.space_type(space_type)?.name.clone();

        let copy = model.clone_space_type(space_type, format!("{} - {}", type_name, space_name))?;
        model.space_mut(space)?.space_type = Some(copy);

        if lpd == 0.0 {
            return Ok(copy);
        }

        let lpd_si = lpd_to_si(lpd, self.units);
        for lights in model.space_type(copy)?.lights.clone() {
            let definition = model.lights(lights)?.definition;
            let private = model.clone_definition(definition)?;
            model.set_definition_wattage(private, lpd_si)?;
            model.lights_mut(lights)?.definition = private;
            info!(space = %space_name, lpd, lpd_si, "set lighting power density");
        }
        Ok(copy)
    }
}

/// One lighting pass over a model.
///
/// Occupancy-sensor credits live only for the pass: they are recorded when a
/// space resolves and read back by `adjust_lighting_schedules`.
pub struct InternalLoads<'a> {
    resolver: LpdResolver<'a>,
    materializer: SpaceMaterializer,
    config: &'a PassConfig,
    credits: BTreeMap<SpaceId, f64>,
    report: PassReport,
}

impl<'a> InternalLoads<'a> {
    pub fn new(lookup: &'a dyn StandardsLookup, overrides: &'a OverrideTables, config: &'a PassConfig) -> Self {
        Self {
            resolver: LpdResolver::new(lookup, overrides),
            materializer: SpaceMaterializer::new(config.dataset_units),
            config,
            credits: BTreeMap::new(),
            report: PassReport::new(),
        }
    }

    /// Resolves and materializes lighting for every space of `space_type`.
    ///
    /// Returns `Ok(false)` for plenum space types, which are left untouched.
    /// Plenum spaces stay on the template, which is then kept. A failure in
    /// one space is recorded in the report and does not stop its siblings.
    pub fn apply_internal_loads(
        &mut self,
        model: &mut Model,
        space_type: SpaceTypeId,
        flags: LoadFlags,
    ) -> LightingResult<bool> {
        let st = model.space_type(space_type)?;
        if space_type_is_plenum(st) {
            info!(space_type = %st.name, "skipping plenum space type");
            self.report.skipped_space_types.push(st.name.clone());
            return Ok(false);
        }
        if !flags.set_lights {
            return Ok(true);
        }
        let type_name = st.name.clone();

        self.materializer.prepare_lights(model, space_type)?;

        // Resolve every space before any space type is copied.
        let spaces = model.spaces_of_type(space_type);
        let mut resolved = Vec::with_capacity(spaces.len());
        for space_id in spaces {
            self.credits.remove(&space_id);
            let space = model.space(space_id)?;
            let space_name = space.name.clone();
            match self.resolver.resolve_space(space, model.space_type(space_type)?) {
                Ok(Some(lighting)) => {
                    self.credits.insert(space_id, lighting.credit);
                    self.report.outcomes.push(SpaceOutcome {
                        space: space_name.clone(),
                        space_type: type_name.clone(),
                        lpd: lighting.lpd,
                        credit: lighting.credit,
                        source: lighting.source,
                    });
                    resolved.push((space_id, space_name, lighting.lpd));
                }
                Ok(None) => debug!(space = %space_name, "plenum space left on its space type"),
                Err(e) => {
                    warn!(space = %space_name, error = %e, "lighting resolution failed");
                    self.report.record_failure(&space_name, "resolve", &e);
                    resolved.push((space_id, space_name, 0.0));
                }
            }
        }

        for (space_id, space_name, lpd) in resolved {
            if let Err(e) = self.materializer.materialize(model, space_id, space_type, lpd) {
                warn!(space = %space_name, error = %e, "lighting materialization failed");
                self.report.record_failure(&space_name, "materialize", &e);
                self.credits.remove(&space_id);
            }
        }

        if self.config.remove_unused_space_types {
            if model.spaces_of_type(space_type).is_empty() {
                model.remove_space_type(space_type)?;
                debug!(space_type = %type_name, "removed original space type");
            } else {
                debug!(space_type = %type_name, "original space type still in use, kept");
            }
        }
        Ok(true)
    }

    /// Replaces each space's lighting schedule with a copy adjusted for the
    /// occupancy-sensor credit resolved in this pass. Spaces without a credit
    /// are left alone; a failing space does not stop the others.
    pub fn adjust_lighting_schedules(&mut self, model: &mut Model) {
        let mut transformer = ScheduleTransformer::new();

        for (space_id, credit) in std::mem::take(&mut self.credits) {
            let space_name = match model.space(space_id) {
                Ok(space) => space.name.clone(),
                Err(_) => space_id.to_string(),
            };
            if let Err(e) = Self::adjust_space_schedule(model, &mut transformer, space_id, credit) {
                warn!(space = %space_name, error = %e, "lighting schedule adjustment failed");
                self.report.record_failure(&space_name, "schedule", &e);
            }
        }

        self.report.schedules_created += transformer.created();
        self.report.schedules_reused += transformer.reused();
    }

    fn adjust_space_schedule(
        model: &mut Model,
        transformer: &mut ScheduleTransformer,
        space: SpaceId,
        credit: f64,
    ) -> LightingResult<()> {
        let Some(space_type) = model.space(space)?.space_type else {
            return Ok(());
        };
        let Some(&lights) = model.space_type(space_type)?.lights.first() else {
            return Ok(());
        };
        let Some(schedule) = model.lights(lights)?.schedule else {
            return Ok(());
        };
        let adjusted = transformer.adjust(model, schedule, credit)?;
        model.lights_mut(lights)?.schedule = Some(adjusted);
        Ok(())
    }

    /// Credit resolved for `space` in this pass, if any.
    pub fn credit(&self, space: SpaceId) -> Option<f64> {
        self.credits.get(&space).copied()
    }

    pub fn report(&self) -> &PassReport {
        &self.report
    }

    pub fn into_report(self) -> PassReport {
        self.report
    }
}

/// Runs lighting resolution over every space type present at the start,
/// then adjusts lighting schedules. A space type that cannot be processed is
/// recorded in the report and skipped.
pub fn run_pass(
    model: &mut Model,
    lookup: &dyn StandardsLookup,
    overrides: &OverrideTables,
    config: &PassConfig,
) -> PassReport {
    let mut loads = InternalLoads::new(lookup, overrides, config);
    for space_type in model.space_type_ids() {
        let type_name = match model.space_type(space_type) {
            Ok(st) => st.name.clone(),
            Err(_) => space_type.to_string(),
        };
        if let Err(e) = loads.apply_internal_loads(model, space_type, config.load_flags) {
            warn!(space_type = %type_name, error = %e, "space type could not be processed");
            loads.report.record_failure(&type_name, "space type", &e);
        }
    }
    if config.load_flags.set_lights {
        loads.adjust_lighting_schedules(model);
    }
    loads.into_report()
}
