//! Error types for lighting power density resolution.

use thiserror::Error;

/// Errors raised while resolving, materializing or rescheduling lighting loads.
#[derive(Debug, Error)]
pub enum LightingError {
    /// Sub-category absent from the standards dataset.
    #[error("standards sub-category not found: {sub_category}")]
    NotFound { sub_category: String },

    /// A checked division whose divisor is zero.
    #[error("division by zero: {context}")]
    DivisionByZero { context: String },

    /// Occupancy-sensor credit outside [0, 1) or not finite.
    #[error("invalid occupancy-sensor credit {value}; must lie in [0, 1)")]
    InvalidCredit { value: f64 },

    /// Space geometry cannot produce a height.
    #[error("space '{space}' has invalid floor area {floor_area}")]
    Geometry { space: String, floor_area: f64 },

    #[error("unknown space id {0}")]
    UnknownSpace(u32),

    #[error("unknown space type id {0}")]
    UnknownSpaceType(u32),

    #[error("unknown schedule id {0}")]
    UnknownSchedule(u32),

    #[error("unknown lights id {0}")]
    UnknownLights(u32),

    #[error("unknown lights definition id {0}")]
    UnknownDefinition(u32),

    /// Malformed dataset or override row.
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for lighting operations.
pub type LightingResult<T> = Result<T, LightingError>;
