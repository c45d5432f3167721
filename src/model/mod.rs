//! In-memory building model.
//!
//! Objects live in an arena keyed by typed ids so that shared templates
//! (space types, lights definitions) are referenced rather than owned. Ids are
//! allocated monotonically, so iteration follows creation order.
//!
//! - [`Space`]: physical room with geometry and a space type reference
//! - [`SpaceType`]: shared load template owning [`Lights`] instances
//! - [`LightsDefinition`]: per-area wattage, shared between instances
//! - [`ScheduleRuleset`]: lighting schedules

pub mod space;

pub use space::{Lights, LightsDefinition, Space, SpaceType};

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LightingError, LightingResult};
use crate::sim::schedule::ScheduleRuleset;

macro_rules! model_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

model_id!(SpaceId);
model_id!(SpaceTypeId);
model_id!(LightsId);
model_id!(LightsDefinitionId);
model_id!(ScheduleId);

/// The building model arena.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    next_id: u32,
    #[serde(default)]
    spaces: BTreeMap<SpaceId, Space>,
    #[serde(default)]
    space_types: BTreeMap<SpaceTypeId, SpaceType>,
    #[serde(default)]
    lights: BTreeMap<LightsId, Lights>,
    #[serde(default)]
    definitions: BTreeMap<LightsDefinitionId, LightsDefinition>,
    #[serde(default)]
    schedules: BTreeMap<ScheduleId, ScheduleRuleset>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a model from a JSON document.
    pub fn from_json_str(json: &str) -> LightingResult<Self> {
        let mut model: Model = serde_json::from_str(json)?;
        model.next_id = model.max_id().map_or(0, |id| id + 1).max(model.next_id);
        Ok(model)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> LightingResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> LightingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn max_id(&self) -> Option<u32> {
        let spaces = self.spaces.keys().map(|id| id.0);
        let space_types = self.space_types.keys().map(|id| id.0);
        let lights = self.lights.keys().map(|id| id.0);
        let definitions = self.definitions.keys().map(|id| id.0);
        let schedules = self.schedules.keys().map(|id| id.0);
        spaces
            .chain(space_types)
            .chain(lights)
            .chain(definitions)
            .chain(schedules)
            .max()
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_space(&mut self, space: Space) -> SpaceId {
        let id = SpaceId(self.allocate());
        self.spaces.insert(id, space);
        id
    }

    pub fn add_space_type(&mut self, space_type: SpaceType) -> SpaceTypeId {
        let id = SpaceTypeId(self.allocate());
        self.space_types.insert(id, space_type);
        id
    }

    pub fn add_lights_definition(&mut self, definition: LightsDefinition) -> LightsDefinitionId {
        let id = LightsDefinitionId(self.allocate());
        self.definitions.insert(id, definition);
        id
    }

    /// Adds a lights instance and attaches it to `space_type`.
    pub fn add_lights(&mut self, space_type: SpaceTypeId, lights: Lights) -> LightingResult<LightsId> {
        if !self.definitions.contains_key(&lights.definition) {
            return Err(LightingError::UnknownDefinition(lights.definition.0));
        }
        if !self.space_types.contains_key(&space_type) {
            return Err(LightingError::UnknownSpaceType(space_type.0));
        }
        let id = LightsId(self.allocate());
        self.lights.insert(id, lights);
        self.space_type_mut(space_type)?.lights.push(id);
        Ok(id)
    }

    pub fn add_schedule(&mut self, schedule: ScheduleRuleset) -> ScheduleId {
        let id = ScheduleId(self.allocate());
        self.schedules.insert(id, schedule);
        id
    }

    pub fn space(&self, id: SpaceId) -> LightingResult<&Space> {
        self.spaces.get(&id).ok_or(LightingError::UnknownSpace(id.0))
    }

    pub fn space_mut(&mut self, id: SpaceId) -> LightingResult<&mut Space> {
        self.spaces.get_mut(&id).ok_or(LightingError::UnknownSpace(id.0))
    }

    pub fn space_type(&self, id: SpaceTypeId) -> LightingResult<&SpaceType> {
        self.space_types
            .get(&id)
            .ok_or(LightingError::UnknownSpaceType(id.0))
    }

    pub fn space_type_mut(&mut self, id: SpaceTypeId) -> LightingResult<&mut SpaceType> {
        self.space_types
            .get_mut(&id)
            .ok_or(LightingError::UnknownSpaceType(id.0))
    }

    pub fn lights(&self, id: LightsId) -> LightingResult<&Lights> {
        self.lights.get(&id).ok_or(LightingError::UnknownLights(id.0))
    }

    pub fn lights_mut(&mut self, id: LightsId) -> LightingResult<&mut Lights> {
        self.lights.get_mut(&id).ok_or(LightingError::UnknownLights(id.0))
    }

    pub fn definition(&self, id: LightsDefinitionId) -> LightingResult<&LightsDefinition> {
        self.definitions
            .get(&id)
            .ok_or(LightingError::UnknownDefinition(id.0))
    }

    pub fn schedule(&self, id: ScheduleId) -> LightingResult<&ScheduleRuleset> {
        self.schedules
            .get(&id)
            .ok_or(LightingError::UnknownSchedule(id.0))
    }

    pub fn space_ids(&self) -> Vec<SpaceId> {
        self.spaces.keys().copied().collect()
    }

    pub fn space_type_ids(&self) -> Vec<SpaceTypeId> {
        self.space_types.keys().copied().collect()
    }

    pub fn spaces(&self) -> impl Iterator<Item = (SpaceId, &Space)> {
        self.spaces.iter().map(|(id, space)| (*id, space))
    }

    pub fn space_types(&self) -> impl Iterator<Item = (SpaceTypeId, &SpaceType)> {
        self.space_types.iter().map(|(id, st)| (*id, st))
    }

    pub fn schedule_count(&self) -> usize {
        self.schedules.len()
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Spaces currently assigned to `space_type`, in creation order.
    pub fn spaces_of_type(&self, space_type: SpaceTypeId) -> Vec<SpaceId> {
        self.spaces
            .iter()
            .filter(|(_, space)| space.space_type == Some(space_type))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Lights definition in effect for a space through its space type's
    /// first lights instance.
    pub fn space_lights_definition(&self, space: SpaceId) -> LightingResult<Option<&LightsDefinition>> {
        let Some(space_type) = self.space(space)?.space_type else {
            return Ok(None);
        };
        let Some(&lights) = self.space_type(space_type)?.lights.first() else {
            return Ok(None);
        };
        let definition = self.lights(lights)?.definition;
        self.definition(definition).map(Some)
    }

    /// Number of lights instances referencing `definition`.
    pub fn definition_users(&self, definition: LightsDefinitionId) -> usize {
        self.lights
            .values()
            .filter(|lights| lights.definition == definition)
            .count()
    }

    /// Copies a definition under a new id. The original is left untouched.
    pub fn clone_definition(&mut self, id: LightsDefinitionId) -> LightingResult<LightsDefinitionId> {
        let copy = self.definition(id)?.clone();
        Ok(self.add_lights_definition(copy))
    }

    pub fn set_definition_wattage(
        &mut self,
        id: LightsDefinitionId,
        watts_per_space_floor_area: f64,
    ) -> LightingResult<()> {
        self.definitions
            .get_mut(&id)
            .ok_or(LightingError::UnknownDefinition(id.0))?
            .watts_per_space_floor_area = watts_per_space_floor_area;
        Ok(())
    }

    /// Deep-copies a space type under `name`: lights instances are copied,
    /// their definitions stay shared.
    pub fn clone_space_type(&mut self, id: SpaceTypeId, name: impl Into<String>) -> LightingResult<SpaceTypeId> {
        let source = self.space_type(id)?.clone();
        let instances = source
            .lights
            .iter()
            .map(|lights| self.lights(*lights).cloned())
            .collect::<LightingResult<Vec<_>>>()?;

        let copy = SpaceType {
            name: name.into(),
            standards_space_type: source.standards_space_type,
            lights: Vec::new(),
        };
        let copy_id = self.add_space_type(copy);
        for lights in instances {
            self.add_lights(copy_id, lights)?;
        }
        Ok(copy_id)
    }

    /// Detaches and deletes a lights instance, dropping its definition when
    /// nothing else references it.
    pub fn remove_lights(&mut self, id: LightsId) -> LightingResult<Lights> {
        let lights = self.lights.remove(&id).ok_or(LightingError::UnknownLights(id.0))?;
        for space_type in self.space_types.values_mut() {
            space_type.lights.retain(|l| *l != id);
        }
        self.remove_definition_if_unused(lights.definition);
        Ok(lights)
    }

    /// Deletes a definition no lights instance references. Returns whether
    /// it was removed.
    pub fn remove_definition_if_unused(&mut self, id: LightsDefinitionId) -> bool {
        if self.definition_users(id) > 0 {
            return false;
        }
        self.definitions.remove(&id).is_some()
    }

    /// Deletes a space type and the lights it owns. Spaces still pointing at
    /// it are left unassigned.
    pub fn remove_space_type(&mut self, id: SpaceTypeId) -> LightingResult<SpaceType> {
        let lights = self.space_type(id)?.lights.clone();
        for lights_id in lights {
            self.remove_lights(lights_id)?;
        }
        for space in self.spaces.values_mut() {
            if space.space_type == Some(id) {
                space.space_type = None;
            }
        }
        self.space_types
            .remove(&id)
            .ok_or(LightingError::UnknownSpaceType(id.0))
    }
}
