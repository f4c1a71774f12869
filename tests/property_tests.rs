use bodycomp::classification::ClassificationEngine;
use bodycomp::import::{CsvImporter, ImportFormat};
use bodycomp::{
    compute_view, CompositionCalculator, Engine, Gender, MemoryPreferenceStore, RawMeasurement,
    Segment, SegmentalEstimator, TimeRange, UserProfile,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

/// Property-based checks of the analytics pipeline

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

prop_compose! {
    fn measurement()(
        minutes in 0i64..(6 * 365 * 24 * 60),
        weight in 40.0f64..160.0,
        body_fat in prop::option::of(5.0f64..50.0),
        muscle in prop::option::of(20.0f64..45.0),
        arm in prop::option::of(20.0f64..45.0),
        trunk in prop::option::of(15.0f64..35.0),
        leg in prop::option::of(35.0f64..60.0),
        bmi in prop::option::of(15.0f64..45.0),
    ) -> RawMeasurement {
        let mut m = RawMeasurement::new(base_time() + Duration::minutes(minutes), weight);
        m.body_fat_percent = body_fat;
        m.skeletal_muscle_percent = muscle;
        m.arm_muscle_pct = arm;
        m.trunk_muscle_pct = trunk;
        m.leg_muscle_pct = leg;
        m.arm_fat_pct = body_fat;
        m.trunk_fat_pct = body_fat;
        m.leg_fat_pct = body_fat;
        m.bmi = bmi;
        m
    }
}

fn sorted_series(max: usize) -> impl Strategy<Value = Vec<RawMeasurement>> {
    prop::collection::vec(measurement(), 0..max).prop_map(|mut series| {
        series.sort_by_key(|m| m.timestamp);
        series
    })
}

fn range() -> impl Strategy<Value = TimeRange> {
    prop_oneof![
        Just(TimeRange::All),
        Just(TimeRange::ThreeMonths),
        Just(TimeRange::OneYear),
        (2019i32..2027).prop_map(TimeRange::Year),
    ]
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn to_csv(series: &[RawMeasurement]) -> String {
    let mut content = String::from(
        "date,tz,weight,fat,fatkg,visceral,bmr,sm,smkg,arm,trunk,leg,sub,armfat,trunkfat,legfat,bmi,age\n",
    );
    for m in series {
        content.push_str(&format!(
            "\"{}\",\"UTC\",\"{}\",\"{}\",\"\",\"\",\"\",\"{}\",\"\",\"{}\",\"{}\",\"{}\",\"\",\"{}\",\"{}\",\"{}\",\"{}\",\"\"\n",
            m.timestamp.format("%Y/%m/%d %H:%M"),
            m.weight,
            cell(m.body_fat_percent),
            cell(m.skeletal_muscle_percent),
            cell(m.arm_muscle_pct),
            cell(m.trunk_muscle_pct),
            cell(m.leg_muscle_pct),
            cell(m.arm_fat_pct),
            cell(m.trunk_fat_pct),
            cell(m.leg_fat_pct),
            cell(m.bmi),
        ));
    }
    content
}

proptest! {
    #[test]
    fn test_ingested_series_is_sorted(series in prop::collection::vec(measurement(), 0..30)) {
        let parsed = CsvImporter::new().import_str(&to_csv(&series));

        prop_assert_eq!(parsed.len(), series.len());
        prop_assert!(parsed.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_view_is_deterministic(
        series in sorted_series(30),
        range in range(),
        height in prop::option::of(120.0f64..220.0),
    ) {
        let profile = UserProfile::new(Gender::Female, height);
        prop_assert_eq!(
            compute_view(&series, &profile, range),
            compute_view(&series, &profile, range)
        );
    }

    #[test]
    fn test_ingesting_same_text_twice_is_identical(
        series in prop::collection::vec(measurement(), 0..30),
        range in range(),
        height in prop::option::of(120.0f64..220.0),
    ) {
        let text = to_csv(&series);
        let profile = UserProfile::new(Gender::Male, height);

        let first = CsvImporter::new().import_str(&text);
        let second = CsvImporter::new().import_str(&text);
        prop_assert_eq!(&first, &second);

        let mut engine = Engine::new(MemoryPreferenceStore::new());
        engine.ingest(&text);
        engine.set_height(height).unwrap();
        engine.set_time_range(range);
        let from_engine = engine.view();

        engine.ingest(&text);
        prop_assert_eq!(&engine.view(), &from_engine);
        prop_assert_eq!(compute_view(&first, &profile, range), from_engine);
    }

    #[test]
    fn test_mass_conservation(raw in measurement()) {
        let d = CompositionCalculator::derive(&raw);

        if let (Some(ffm), Some(fat)) = (d.fat_free_mass, d.raw.effective_body_fat_mass()) {
            prop_assert!((ffm + fat - raw.weight).abs() < 1e-9);

            let tbw = d.total_body_water.unwrap();
            let icw = d.intracellular_water.unwrap();
            let ecw = d.extracellular_water.unwrap();
            prop_assert!((icw + ecw - tbw).abs() < 1e-9);

            let rebuilt = tbw + d.protein.unwrap() + d.bone_mass.unwrap();
            prop_assert!((rebuilt - ffm).abs() < 1e-9);
            prop_assert!((d.soft_lean_mass.unwrap() + d.bone_mass.unwrap() - ffm).abs() < 1e-9);
        } else {
            prop_assert!(d.total_body_water.is_none());
            prop_assert!(d.protein.is_none());
        }
    }

    #[test]
    fn test_range_selects_contiguous_subset(series in sorted_series(40), range in range()) {
        let profile = UserProfile::default();
        let all = compute_view(&series, &profile, TimeRange::All);
        let view = compute_view(&series, &profile, range);

        prop_assert!(view.len() <= all.len());
        prop_assert_eq!(view.total_records, series.len());

        if let Some(first) = view.first() {
            let start = all
                .records
                .iter()
                .position(|r| r == first)
                .expect("selected record must come from the full series");
            prop_assert_eq!(&all.records[start..start + view.len()], &view.records[..]);
        }

        if let (TimeRange::Year(year), false) = (range, view.is_empty()) {
            prop_assert!(view.measurements().all(|m| m.raw.year() == year));
        }
    }

    #[test]
    fn test_rolling_window_contains_latest(series in sorted_series(40)) {
        prop_assume!(!series.is_empty());
        let profile = UserProfile::default();

        for range in [TimeRange::ThreeMonths, TimeRange::OneYear] {
            let view = compute_view(&series, &profile, range);
            let latest = view.latest().unwrap();
            prop_assert_eq!(latest.measurement.raw.timestamp, series.last().unwrap().timestamp);
        }
    }

    #[test]
    fn test_segmental_symmetry(raw in measurement()) {
        let breakdown = SegmentalEstimator::estimate(&raw);

        prop_assert_eq!(breakdown.get(Segment::LeftArm), &bodycomp::segmental::SegmentEstimate {
            segment: Segment::LeftArm,
            ..*breakdown.get(Segment::RightArm)
        });
        prop_assert_eq!(breakdown.get(Segment::LeftLeg), &bodycomp::segmental::SegmentEstimate {
            segment: Segment::LeftLeg,
            ..*breakdown.get(Segment::RightLeg)
        });
    }

    #[test]
    fn test_height_override_applies_to_every_record(
        series in sorted_series(20),
        height in 100.0f64..230.0,
    ) {
        let with_height = compute_view(&series, &UserProfile::new(Gender::Male, Some(height)), TimeRange::All);
        let without = compute_view(&series, &UserProfile::default(), TimeRange::All);
        let height_m = height / 100.0;

        for (adjusted, baseline) in with_height.measurements().zip(without.measurements()) {
            prop_assert_eq!(baseline.ffmi, baseline.baseline_ffmi);
            match adjusted.fat_free_mass {
                Some(ffm) => prop_assert!((adjusted.ffmi.unwrap() - ffm / (height_m * height_m)).abs() < 1e-9),
                None => prop_assert!(adjusted.ffmi.is_none()),
            }
        }
    }

    #[test]
    fn test_ffmi_bands_are_monotonic(a in -10.0f64..50.0, b in -10.0f64..50.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        for gender in [Gender::Male, Gender::Female] {
            prop_assert!(
                ClassificationEngine::ffmi_score(low, gender) <= ClassificationEngine::ffmi_score(high, gender)
            );
        }
    }

    #[test]
    fn test_bmi_category_is_total(bmi in prop::num::f64::ANY) {
        // Any value, NaN included, gets a category
        let _ = ClassificationEngine::bmi_category(bmi);
    }
}
