use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use prm_lighting::model::{Lights, LightsDefinition, Space, SpaceType};
use prm_lighting::sim::schedule::{DaySchedule, ScheduleRule, ScheduleRuleset, WeekdayMask};
use prm_lighting::standards::OccupancyControlMode;
use prm_lighting::{
    run_pass, Model, OverrideTables, PassConfig, StandardsDataset, StandardsRecord,
    UserOverrideRecord,
};

const CATEGORIES: [&str; 3] = ["office - enclosed", "corridor", "atrium"];

fn building(space_types: usize, spaces_per_type: usize) -> Model {
    let mut model = Model::new();

    let mut schedule = ScheduleRuleset::new("Office Lighting");
    let mut hourly = [0.05; 24];
    for value in hourly.iter_mut().take(18).skip(8) {
        *value = 0.9;
    }
    schedule.add_rule(ScheduleRule::new(
        "Weekday",
        DaySchedule::from_hourly("Weekday Day", &hourly),
        WeekdayMask::weekdays(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    ));
    let schedule = model.add_schedule(schedule);

    for t in 0..space_types {
        let name = format!("Type {}", t);
        let st = model.add_space_type(
            SpaceType::new(name.clone())
                .with_standards_space_type(CATEGORIES[t % CATEGORIES.len()]),
        );
        let def = model.add_lights_definition(LightsDefinition::new(format!("{} LPD", name), 10.0));
        model
            .add_lights(st, Lights::new(format!("{} Lights", name), def).with_schedule(schedule))
            .unwrap();
        for s in 0..spaces_per_type {
            let height = 2.5 + (s % 4) as f64 * 0.5;
            model.add_space(
                Space::new(format!("{} Space {}", name, s), 50.0, 50.0 * height)
                    .with_space_type(st),
            );
        }
    }
    model
}

fn bench_run_pass(c: &mut Criterion) {
    let dataset = StandardsDataset::from_records([
        StandardsRecord::new(CATEGORIES[0], 0.93, 0.0).with_sensor_savings(
            OccupancyControlMode::ManualOnOrPartialAuto,
            0.25,
            0.1,
        ),
        StandardsRecord::new(CATEGORIES[1], 0.41, 0.0),
        StandardsRecord::new(CATEGORIES[2], 0.03, 0.4),
    ]);
    let mut overrides = OverrideTables::new();
    overrides.insert_space_type(UserOverrideRecord::new(
        "Type 0",
        [(CATEGORIES[0], 0.7), (CATEGORIES[1], 0.3)],
    ));
    let config = PassConfig::default();
    let base = building(20, 25);

    c.bench_function("run_pass_20_types_500_spaces", |b| {
        b.iter_batched(
            || base.clone(),
            |mut model| run_pass(&mut model, &dataset, &overrides, &config),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_run_pass);
criterion_main!(benches);
