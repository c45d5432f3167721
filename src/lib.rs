//! Interior lighting power density resolution for building energy models.
//!
//! For every space in a [`Model`], [`run_pass`] picks the lighting power
//! density from a space override, a space type override or the standards
//! dataset, gives the space a private copy of its space type carrying that
//! LPD, and rewrites its lighting schedule to remove the blanket
//! occupancy-sensor reduction so the per-space credit can be applied.

pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod sim;
pub mod standards;
pub mod units;

pub use config::{LoadFlags, PassConfig};
pub use error::{LightingError, LightingResult};
pub use model::{Model, ScheduleId, SpaceId, SpaceTypeId};
pub use report::PassReport;
pub use sim::internal_loads::{run_pass, InternalLoads, SpaceMaterializer};
pub use sim::lighting::{LpdResolver, LpdSource, SpaceLighting};
pub use sim::occupancy::{ScheduleCache, ScheduleTransformer};
pub use standards::{OverrideTables, StandardsDataset, StandardsLookup, StandardsRecord, UserOverrideRecord};
