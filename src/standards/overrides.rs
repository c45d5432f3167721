//! User override tables.
//!
//! Rows are keyed by a space or space type name and list numbered
//! `std_ltg_typeNN` / `std_ltg_type_fracNN` pairs, bounded by
//! `num_std_ltg_types`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::value_as_f64;
use crate::error::{LightingError, LightingResult};

/// Column suffixes are two digits, so no row can carry more pairs.
pub const MAX_OVERRIDE_ENTRIES: usize = 99;

/// A sub-category and the share of the space it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideEntry {
    /// `None` when the row leaves the sub-category blank.
    pub sub_category: Option<String>,
    pub fraction: f64,
}

/// An ordered blend of sub-categories; fractions need not sum to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct UserOverrideRecord {
    pub name: String,
    pub entries: Vec<OverrideEntry>,
}

impl UserOverrideRecord {
    pub fn new<S: Into<String>>(name: impl Into<String>, entries: impl IntoIterator<Item = (S, f64)>) -> Self {
        Self {
            name: name.into(),
            entries: entries
                .into_iter()
                .map(|(sub_category, fraction)| OverrideEntry {
                    sub_category: Some(sub_category.into()),
                    fraction,
                })
                .collect(),
        }
    }

    /// Single-entry record covering the whole space with one sub-category.
    pub fn single(name: impl Into<String>, sub_category: impl Into<String>) -> Self {
        Self::new(name, [(sub_category.into(), 1.0)])
    }

    /// Parses one flat table row.
    pub fn from_row(row: &Map<String, Value>) -> LightingResult<Self> {
        let name = row
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| LightingError::Dataset("override row is missing 'name'".to_string()))?
            .to_string();

        let declared = row
            .get("num_std_ltg_types")
            .and_then(value_as_f64)
            .map_or(0, |n| n.clamp(0.0, MAX_OVERRIDE_ENTRIES as f64) as usize);
        // Trailing indices with neither column contribute nothing.
        let count = (1..=declared)
            .rev()
            .find(|&index| {
                row.contains_key(&format!("std_ltg_type{:02}", index))
                    || row.contains_key(&format!("std_ltg_type_frac{:02}", index))
            })
            .unwrap_or(0);

        let entries = (1..=count)
            .map(|index| {
                let sub_category = row
                    .get(&format!("std_ltg_type{:02}", index))
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from);
                let fraction = row
                    .get(&format!("std_ltg_type_frac{:02}", index))
                    .and_then(value_as_f64)
                    .unwrap_or(0.0);
                OverrideEntry {
                    sub_category,
                    fraction,
                }
            })
            .collect();

        Ok(Self { name, entries })
    }
}

#[derive(Deserialize)]
struct OverrideDocument {
    #[serde(default)]
    userdata_space: Vec<Map<String, Value>>,
    #[serde(default)]
    userdata_spacetype: Vec<Map<String, Value>>,
}

/// Per-space and per-space-type override tables.
#[derive(Debug, Clone, Default)]
pub struct OverrideTables {
    by_space: HashMap<String, UserOverrideRecord>,
    by_space_type: HashMap<String, UserOverrideRecord>,
}

impl OverrideTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{"userdata_space": [...], "userdata_spacetype": [...]}`.
    ///
    /// When a name repeats, the first row wins.
    pub fn from_json_str(json: &str) -> LightingResult<Self> {
        let document: OverrideDocument = serde_json::from_str(json)?;
        let mut tables = Self::new();
        for row in &document.userdata_space {
            let record = UserOverrideRecord::from_row(row)?;
            tables.by_space.entry(record.name.clone()).or_insert(record);
        }
        for row in &document.userdata_spacetype {
            let record = UserOverrideRecord::from_row(row)?;
            tables.by_space_type.entry(record.name.clone()).or_insert(record);
        }
        Ok(tables)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> LightingResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn insert_space(&mut self, record: UserOverrideRecord) {
        self.by_space.insert(record.name.clone(), record);
    }

    pub fn insert_space_type(&mut self, record: UserOverrideRecord) {
        self.by_space_type.insert(record.name.clone(), record);
    }

    pub fn for_space(&self, space_name: &str) -> Option<&UserOverrideRecord> {
        self.by_space.get(space_name)
    }

    pub fn for_space_type(&self, space_type_name: &str) -> Option<&UserOverrideRecord> {
        self.by_space_type.get(space_type_name)
    }

    pub fn is_empty(&self) -> bool {
        self.by_space.is_empty() && self.by_space_type.is_empty()
    }
}
