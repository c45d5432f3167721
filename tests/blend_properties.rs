//! Property tests for the fraction-weighted LPD blend.

use prm_lighting::standards::OccupancyControlMode;
use prm_lighting::{LpdResolver, OverrideTables, StandardsDataset, StandardsRecord, UserOverrideRecord};
use proptest::prelude::*;

const CATEGORIES: [&str; 4] = ["office - enclosed", "corridor", "atrium", "laboratory"];

fn dataset() -> StandardsDataset {
    StandardsDataset::from_records([
        StandardsRecord::new(CATEGORIES[0], 0.93, 0.0).with_sensor_savings(
            OccupancyControlMode::ManualOnOrPartialAuto,
            0.25,
            0.1,
        ),
        StandardsRecord::new(CATEGORIES[1], 0.41, 0.0),
        StandardsRecord::new(CATEGORIES[2], 0.03, 0.4),
        StandardsRecord::new(CATEGORIES[3], 1.33, 0.05).with_sensor_savings(
            OccupancyControlMode::AutoOn,
            0.2,
            0.15,
        ),
    ])
}

/// Entries whose fractions are multiples of 1/8 summing to exactly 1.0.
fn arb_entries() -> impl Strategy<Value = Vec<(&'static str, f64)>> {
    (
        prop::sample::subsequence((1u32..8).collect::<Vec<_>>(), 0..=7),
        prop::collection::vec(0usize..CATEGORIES.len(), 8),
    )
        .prop_map(|(cuts, categories)| {
            let mut bounds = vec![0u32];
            bounds.extend(cuts);
            bounds.push(8);
            bounds
                .windows(2)
                .zip(categories)
                .map(|(w, category)| (CATEGORIES[category], f64::from(w[1] - w[0]) / 8.0))
                .collect()
        })
}

proptest! {
    #[test]
    fn lpd_is_independent_of_entry_order(entries in arb_entries(), height in 2.0f64..12.0) {
        let dataset = dataset();
        let overrides = OverrideTables::new();
        let resolver = LpdResolver::new(&dataset, &overrides);

        let forward = UserOverrideRecord::new("Forward", entries.clone());
        let mut reversed_entries = entries.clone();
        reversed_entries.reverse();
        let reversed = UserOverrideRecord::new("Reversed", reversed_entries);

        let (lpd_forward, credit_forward) = resolver.blend(&forward, height).unwrap();
        let (lpd_reversed, credit_reversed) = resolver.blend(&reversed, height).unwrap();

        let expected: f64 = entries
            .iter()
            .map(|(category, fraction)| {
                let row = dataset_row(category);
                (row.0 * height + row.1) * fraction
            })
            .sum();

        prop_assert!((lpd_forward - lpd_reversed).abs() < 1e-9);
        prop_assert!((lpd_forward - expected).abs() < 1e-9);
        prop_assert!((credit_forward - credit_reversed).abs() < 1e-9);
    }

    #[test]
    fn credit_stays_within_row_rates(entries in arb_entries(), height in 2.0f64..12.0) {
        let dataset = dataset();
        let overrides = OverrideTables::new();
        let resolver = LpdResolver::new(&dataset, &overrides);

        let (_, credit) = resolver.blend(&UserOverrideRecord::new("Any", entries), height).unwrap();
        prop_assert!((0.0..=0.25).contains(&credit));
    }
}

/// (W per length, W per area) for a category in [`dataset`].
fn dataset_row(category: &str) -> (f64, f64) {
    match category {
        "office - enclosed" => (0.0, 0.93),
        "corridor" => (0.0, 0.41),
        "atrium" => (0.4, 0.03),
        _ => (0.05, 1.33),
    }
}
