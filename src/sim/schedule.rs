//! Rule-based schedules for lighting loads.
//!
//! A [`ScheduleRuleset`] holds a default day, two design days and an ordered
//! list of calendar-bound [`ScheduleRule`]s. Each day is a [`DaySchedule`]: an
//! ordered sequence of breakpoints, where every breakpoint carries the value
//! that holds *until* its time of day.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Minutes in one day; the last breakpoint of every day ends here.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A value holding until `until_minute` (1..=1440, minutes after midnight).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub until_minute: u32,
    pub value: f64,
}

/// One day's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    /// Schedule name or identifier.
    pub name: String,
    /// Breakpoints sorted by `until_minute`; never empty.
    breakpoints: Vec<Breakpoint>,
}

impl DaySchedule {
    /// Creates a day holding zero all day.
    pub fn new(name: impl Into<String>) -> Self {
        Self::constant(name, 0.0)
    }

    /// Creates a day holding `value` all day.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            breakpoints: vec![Breakpoint {
                until_minute: MINUTES_PER_DAY,
                value,
            }],
        }
    }

    /// Builds a day from 24 hourly values, merging consecutive equal hours.
    pub fn from_hourly(name: impl Into<String>, hourly: &[f64; 24]) -> Self {
        let mut day = Self::new(name);
        day.breakpoints.clear();
        for (hour, &value) in hourly.iter().enumerate() {
            let until_minute = (hour as u32 + 1) * 60;
            match day.breakpoints.last_mut() {
                Some(last) if last.value == value => last.until_minute = until_minute,
                _ => day.breakpoints.push(Breakpoint {
                    until_minute,
                    value,
                }),
            }
        }
        day
    }

    /// Sets the value holding until `until_minute`.
    ///
    /// Replaces an existing breakpoint at the same time. Times are clamped
    /// into 1..=1440.
    pub fn add_value(&mut self, until_minute: u32, value: f64) {
        let until_minute = until_minute.clamp(1, MINUTES_PER_DAY);
        match self
            .breakpoints
            .binary_search_by_key(&until_minute, |b| b.until_minute)
        {
            Ok(idx) => self.breakpoints[idx].value = value,
            Err(idx) => self.breakpoints.insert(
                idx,
                Breakpoint {
                    until_minute,
                    value,
                },
            ),
        }
    }

    /// Resets the day to zero all day.
    pub fn clear_values(&mut self) {
        self.breakpoints = vec![Breakpoint {
            until_minute: MINUTES_PER_DAY,
            value: 0.0,
        }];
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Returns the value in effect at `minute` after midnight.
    pub fn value_at(&self, minute: u32) -> f64 {
        self.breakpoints
            .iter()
            .find(|b| minute < b.until_minute)
            .or_else(|| self.breakpoints.last())
            .map(|b| b.value)
            .unwrap_or(0.0)
    }

    /// Returns the value for a given hour (0-23).
    pub fn hourly_value(&self, hour: usize) -> f64 {
        self.value_at((hour % 24) as u32 * 60)
    }

    /// Copies the day under a new name with every value passed through `f`.
    pub fn map_values(&self, name: impl Into<String>, f: impl Fn(f64) -> f64) -> Self {
        Self {
            name: name.into(),
            breakpoints: self
                .breakpoints
                .iter()
                .map(|b| Breakpoint {
                    until_minute: b.until_minute,
                    value: f(b.value),
                })
                .collect(),
        }
    }
}

/// Weekday applicability of a rule, Sunday through Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekdayMask {
    pub sunday: bool,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
}

impl WeekdayMask {
    pub fn all() -> Self {
        Self::weekdays().union(Self::weekends())
    }

    /// Monday through Friday.
    pub fn weekdays() -> Self {
        Self {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            ..Self::default()
        }
    }

    pub fn weekends() -> Self {
        Self {
            sunday: true,
            saturday: true,
            ..Self::default()
        }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            sunday: self.sunday || other.sunday,
            monday: self.monday || other.monday,
            tuesday: self.tuesday || other.tuesday,
            wednesday: self.wednesday || other.wednesday,
            thursday: self.thursday || other.thursday,
            friday: self.friday || other.friday,
            saturday: self.saturday || other.saturday,
        }
    }

    pub fn set(&mut self, day: Weekday, apply: bool) {
        match day {
            Weekday::Sun => self.sunday = apply,
            Weekday::Mon => self.monday = apply,
            Weekday::Tue => self.tuesday = apply,
            Weekday::Wed => self.wednesday = apply,
            Weekday::Thu => self.thursday = apply,
            Weekday::Fri => self.friday = apply,
            Weekday::Sat => self.saturday = apply,
        }
    }

    pub fn applies_to(&self, day: Weekday) -> bool {
        match day {
            Weekday::Sun => self.sunday,
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
        }
    }
}

/// A day profile active over a date range on selected weekdays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub name: String,
    pub day_schedule: DaySchedule,
    pub apply: WeekdayMask,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ScheduleRule {
    pub fn new(
        name: impl Into<String>,
        day_schedule: DaySchedule,
        apply: WeekdayMask,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            day_schedule,
            apply,
            start_date,
            end_date,
        }
    }

    /// Returns true if the rule covers `date`.
    pub fn is_active(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date && self.apply.applies_to(date.weekday())
    }
}

/// A named ruleset schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRuleset {
    pub name: String,
    pub default_day: DaySchedule,
    pub winter_design_day: DaySchedule,
    pub summer_design_day: DaySchedule,
    /// Rules in priority order; the first active rule wins.
    pub rules: Vec<ScheduleRule>,
}

impl ScheduleRuleset {
    /// Creates a ruleset whose days all hold zero.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            default_day: DaySchedule::new(format!("{} Default", name)),
            winter_design_day: DaySchedule::new(format!("{} Winter Design Day", name)),
            summer_design_day: DaySchedule::new(format!("{} Summer Design Day", name)),
            rules: Vec::new(),
            name,
        }
    }

    pub fn add_rule(&mut self, rule: ScheduleRule) {
        self.rules.push(rule);
    }

    /// Returns the day profile in effect on `date`.
    pub fn day_schedule_for(&self, date: NaiveDate) -> &DaySchedule {
        self.rules
            .iter()
            .find(|rule| rule.is_active(date))
            .map(|rule| &rule.day_schedule)
            .unwrap_or(&self.default_day)
    }

    pub fn value_at(&self, date: NaiveDate, minute: u32) -> f64 {
        self.day_schedule_for(date).value_at(minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_value_keeps_order() {
        let mut day = DaySchedule::new("Office Lights");
        day.add_value(8 * 60, 0.05);
        day.add_value(18 * 60, 0.9);
        day.add_value(18 * 60, 0.85);

        let times: Vec<u32> = day.breakpoints().iter().map(|b| b.until_minute).collect();
        assert_eq!(times, vec![480, 1080, 1440]);
        assert_eq!(day.value_at(0), 0.05);
        assert_eq!(day.value_at(600), 0.85);
        assert_eq!(day.value_at(1200), 0.0);
    }

    #[test]
    fn test_from_hourly_merges_runs() {
        let mut hourly = [0.05; 24];
        for value in hourly.iter_mut().take(18).skip(8) {
            *value = 0.9;
        }
        let day = DaySchedule::from_hourly("Office", &hourly);

        assert_eq!(day.breakpoints().len(), 3);
        assert_eq!(day.hourly_value(7), 0.05);
        assert_eq!(day.hourly_value(8), 0.9);
        assert_eq!(day.hourly_value(17), 0.9);
        assert_eq!(day.hourly_value(18), 0.05);
    }

    #[test]
    fn test_clear_values() {
        let mut day = DaySchedule::constant("Always On", 1.0);
        day.add_value(600, 0.5);
        day.clear_values();
        assert_eq!(day.breakpoints().len(), 1);
        assert_eq!(day.value_at(700), 0.0);
    }

    #[test]
    fn test_weekday_mask() {
        let mask = WeekdayMask::weekdays();
        assert!(mask.applies_to(Weekday::Mon));
        assert!(!mask.applies_to(Weekday::Sun));

        let mut mask = WeekdayMask::default();
        mask.set(Weekday::Sat, true);
        assert_eq!(mask, WeekdayMask { saturday: true, ..WeekdayMask::default() });
        assert_eq!(WeekdayMask::all().union(mask), WeekdayMask::all());
    }

    #[test]
    fn test_ruleset_rule_priority() {
        let mut ruleset = ScheduleRuleset::new("Office Lighting");
        ruleset.default_day = DaySchedule::constant("Default", 0.05);
        ruleset.add_rule(ScheduleRule::new(
            "Weekday",
            DaySchedule::constant("Weekday Day", 0.9),
            WeekdayMask::weekdays(),
            date(2024, 1, 1),
            date(2024, 12, 31),
        ));

        // 2024-01-03 is a Wednesday, 2024-01-06 a Saturday.
        assert_eq!(ruleset.value_at(date(2024, 1, 3), 600), 0.9);
        assert_eq!(ruleset.value_at(date(2024, 1, 6), 600), 0.05);
        assert_eq!(ruleset.value_at(date(2025, 1, 1), 600), 0.05);
    }
}
