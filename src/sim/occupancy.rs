//! Occupancy-sensor adjustment of lighting schedules.
//!
//! Baseline lighting schedules already carry a blanket occupancy-sensor
//! reduction. [`ScheduleTransformer`] removes that reduction from the
//! calendar-bound weekly rules so a per-space credit can be applied later.
//! Design days and the default day are copied unchanged.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{LightingError, LightingResult};
use crate::model::{Model, ScheduleId};
use crate::sim::schedule::{ScheduleRule, ScheduleRuleset};

/// Rounds a credit to the four decimals used in derived schedule names.
pub fn round_credit(credit: f64) -> f64 {
    (credit * 1e4).round() / 1e4
}

/// Name of a schedule object derived for `credit`.
pub fn adjusted_name(base: &str, credit: f64) -> String {
    format!("{}_{:.4}", base, credit)
}

/// Undoes an occupancy-sensor reduction on one schedule value, capped at 1.0.
pub fn remove_sensor_reduction(value: f64, credit: f64) -> f64 {
    (value / (1.0 - credit)).min(1.0)
}

fn check_credit(credit: f64) -> LightingResult<()> {
    if credit == 1.0 {
        return Err(LightingError::DivisionByZero {
            context: "occupancy-sensor credit of 1.0".to_string(),
        });
    }
    if !credit.is_finite() || !(0.0..1.0).contains(&credit) {
        return Err(LightingError::InvalidCredit { value: credit });
    }
    Ok(())
}

/// Builds the adjusted copy of `base` without touching any model.
pub fn adjusted_ruleset(base: &ScheduleRuleset, credit: f64) -> LightingResult<ScheduleRuleset> {
    check_credit(credit)?;

    let mut ruleset = ScheduleRuleset::new(adjusted_name(&base.name, credit));
    ruleset.default_day = base.default_day.clone();
    ruleset.winter_design_day = base.winter_design_day.clone();
    ruleset.summer_design_day = base.summer_design_day.clone();

    for rule in &base.rules {
        let day = rule.day_schedule.map_values(
            adjusted_name(&rule.day_schedule.name, credit),
            |value| remove_sensor_reduction(value, credit),
        );
        ruleset.add_rule(ScheduleRule::new(
            adjusted_name(&rule.name, credit),
            day,
            rule.apply,
            rule.start_date,
            rule.end_date,
        ));
    }
    Ok(ruleset)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    schedule: ScheduleId,
    credit_bits: u64,
}

impl CacheKey {
    fn new(schedule: ScheduleId, credit: f64) -> Self {
        Self {
            schedule,
            credit_bits: round_credit(credit).to_bits(),
        }
    }
}

/// Adjusted schedules built during one pass, keyed by base schedule and
/// rounded credit.
#[derive(Debug, Default)]
pub struct ScheduleCache {
    entries: HashMap<CacheKey, ScheduleId>,
}

impl ScheduleCache {
    pub fn get(&self, schedule: ScheduleId, credit: f64) -> Option<ScheduleId> {
        self.entries.get(&CacheKey::new(schedule, credit)).copied()
    }

    pub fn insert(&mut self, schedule: ScheduleId, credit: f64, adjusted: ScheduleId) {
        self.entries.insert(CacheKey::new(schedule, credit), adjusted);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Memoizing schedule adjuster. Drop it at the end of the pass.
#[derive(Debug, Default)]
pub struct ScheduleTransformer {
    cache: ScheduleCache,
    created: usize,
    reused: usize,
}

impl ScheduleTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `schedule` adjusted for `credit`, adding it to the
    /// model on first request. Later requests with the same schedule and
    /// rounded credit return the same id.
    pub fn adjust(&mut self, model: &mut Model, schedule: ScheduleId, credit: f64) -> LightingResult<ScheduleId> {
        check_credit(credit)?;
        if let Some(adjusted) = self.cache.get(schedule, credit) {
            debug!(schedule = %schedule, credit, "reusing adjusted lighting schedule");
            self.reused += 1;
            return Ok(adjusted);
        }

        let base = model.schedule(schedule)?;
        info!(
            schedule = %base.name,
            credit,
            "creating lighting schedule without occupancy-sensor reduction"
        );
        let ruleset = adjusted_ruleset(base, credit)?;
        let adjusted = model.add_schedule(ruleset);
        self.cache.insert(schedule, credit, adjusted);
        self.created += 1;
        Ok(adjusted)
    }

    /// Schedules added to the model so far.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Requests answered from the cache.
    pub fn reused(&self) -> usize {
        self.reused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::schedule::{DaySchedule, WeekdayMask};
    use chrono::NaiveDate;

    fn office_schedule() -> ScheduleRuleset {
        let mut ruleset = ScheduleRuleset::new("Office Lights");
        ruleset.default_day = DaySchedule::constant("Office Lights Default", 0.05);
        ruleset.summer_design_day = DaySchedule::constant("Office Lights Summer", 1.0);

        let mut weekday = DaySchedule::new("Office Lights Weekday");
        weekday.add_value(8 * 60, 0.05);
        weekday.add_value(12 * 60, 0.6);
        weekday.add_value(18 * 60, 0.9);
        weekday.add_value(24 * 60, 0.05);
        ruleset.add_rule(ScheduleRule::new(
            "Office Lights Weekday Rule",
            weekday,
            WeekdayMask::weekdays(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        ));
        ruleset
    }

    #[test]
    fn test_remove_sensor_reduction() {
        assert!((remove_sensor_reduction(0.6, 0.25) - 0.8).abs() < 1e-12);
        assert_eq!(remove_sensor_reduction(0.9, 0.25), 1.0);
        assert_eq!(remove_sensor_reduction(0.4, 0.0), 0.4);
    }

    #[test]
    fn test_adjusted_ruleset_only_touches_rules() {
        let base = office_schedule();
        let adjusted = adjusted_ruleset(&base, 0.25).unwrap();

        assert_eq!(adjusted.name, "Office Lights_0.2500");
        assert_eq!(adjusted.default_day, base.default_day);
        assert_eq!(adjusted.winter_design_day, base.winter_design_day);
        assert_eq!(adjusted.summer_design_day, base.summer_design_day);

        let rule = &adjusted.rules[0];
        assert_eq!(rule.name, "Office Lights Weekday Rule_0.2500");
        assert_eq!(rule.day_schedule.name, "Office Lights Weekday_0.2500");
        assert_eq!(rule.apply, WeekdayMask::weekdays());
        assert_eq!(rule.start_date, base.rules[0].start_date);
        assert_eq!(rule.end_date, base.rules[0].end_date);

        let values: Vec<f64> = rule.day_schedule.breakpoints().iter().map(|b| b.value).collect();
        let expected = [0.05 / 0.75, 0.8, 1.0, 0.05 / 0.75];
        for (value, expected) in values.iter().zip(expected) {
            assert!((value - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_credit_of_one_is_division_by_zero() {
        let base = office_schedule();
        assert!(matches!(
            adjusted_ruleset(&base, 1.0),
            Err(LightingError::DivisionByZero { .. })
        ));
        assert!(matches!(
            adjusted_ruleset(&base, 1.5),
            Err(LightingError::InvalidCredit { .. })
        ));
        assert!(matches!(
            adjusted_ruleset(&base, f64::NAN),
            Err(LightingError::InvalidCredit { .. })
        ));
    }

    #[test]
    fn test_adjust_is_memoized() {
        let mut model = Model::new();
        let base = model.add_schedule(office_schedule());
        let mut transformer = ScheduleTransformer::new();

        let first = transformer.adjust(&mut model, base, 0.25).unwrap();
        let second = transformer.adjust(&mut model, base, 0.250_001).unwrap();
        let third = transformer.adjust(&mut model, base, 0.3).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, third);
        assert_eq!(model.schedule_count(), 3);
        assert_eq!(transformer.created(), 2);
        assert_eq!(transformer.reused(), 1);
    }
}
