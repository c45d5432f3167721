//! Outcome report for a lighting pass.

use serde::Serialize;

use crate::error::LightingResult;
use crate::sim::lighting::LpdSource;

/// Resolved lighting for one space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpaceOutcome {
    pub space: String,
    pub space_type: String,
    /// LPD in dataset units
    pub lpd: f64,
    pub credit: f64,
    pub source: LpdSource,
}

/// A space whose processing failed; its siblings were still processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpaceFailure {
    pub space: String,
    pub stage: String,
    pub error: String,
}

/// Everything one pass did to a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassReport {
    pub outcomes: Vec<SpaceOutcome>,
    pub failures: Vec<SpaceFailure>,
    /// Space types left alone because they are plenums.
    pub skipped_space_types: Vec<String>,
    pub schedules_created: usize,
    pub schedules_reused: usize,
}

impl PassReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, space: &str, stage: &str, error: &dyn std::error::Error) {
        self.failures.push(SpaceFailure {
            space: space.to_string(),
            stage: stage.to_string(),
            error: error.to_string(),
        });
    }

    pub fn outcome(&self, space: &str) -> Option<&SpaceOutcome> {
        self.outcomes.iter().find(|o| o.space == space)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Generates a Markdown report.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Interior Lighting Report\n\n");

        output.push_str("## Summary\n\n");
        output.push_str("| Metric | Value |\n");
        output.push_str("|--------|-------|\n");
        output.push_str(&format!("| Spaces Resolved | {} |\n", self.outcomes.len()));
        output.push_str(&format!("| Failures | {} |\n", self.failures.len()));
        output.push_str(&format!(
            "| Plenum Space Types Skipped | {} |\n",
            self.skipped_space_types.len()
        ));
        output.push_str(&format!("| Schedules Created | {} |\n", self.schedules_created));
        output.push_str(&format!("| Schedules Reused | {} |\n", self.schedules_reused));
        output.push('\n');

        output.push_str("## Spaces\n\n");
        output.push_str("| Space | Space Type | LPD | Credit | Source |\n");
        output.push_str("|-------|------------|-----|--------|--------|\n");
        for outcome in &self.outcomes {
            output.push_str(&format!(
                "| {} | {} | {:.4} | {:.4} | {:?} |\n",
                outcome.space, outcome.space_type, outcome.lpd, outcome.credit, outcome.source
            ));
        }

        if !self.failures.is_empty() {
            output.push_str("\n## Failures\n\n");
            for failure in &self.failures {
                output.push_str(&format!(
                    "- **{}** ({}): {}\n",
                    failure.space, failure.stage, failure.error
                ));
            }
        }

        output
    }

    /// Generates a CSV report with one row per resolved space.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("Space,Space Type,LPD,Credit,Source\n");
        for outcome in &self.outcomes {
            csv.push_str(&format!(
                "{},{},{:.4},{:.4},{:?}\n",
                outcome.space, outcome.space_type, outcome.lpd, outcome.credit, outcome.source
            ));
        }
        csv
    }

    pub fn to_json(&self) -> LightingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
