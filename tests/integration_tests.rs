use bodycomp::classification::{BmiCategory, FfmiBand, ReferenceStatus, WaterBalance};
use bodycomp::export::{self, ExportFormat};
use bodycomp::import::{demo_series, CsvImporter, ImportFormat, DEMO_CSV};
use bodycomp::preferences::{GENDER_KEY, HEIGHT_KEY};
use bodycomp::report::{BodyAgeTrend, DominantRegion};
use bodycomp::{
    compute_view, CompositionCalculator, CompositionReport, Engine, Gender, MemoryPreferenceStore,
    PreferenceStore, Segment, SegmentalEstimator, TimeRange, UserProfile,
};
use tempfile::tempdir;

/// Integration tests that exercise whole workflows through the public API

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} to be within {} of {}",
        actual,
        tolerance,
        expected
    );
}

const HEADER: &str = "\"date\",\"tz\",\"weight\",\"fat%\",\"fat kg\",\"visceral\",\"bmr\",\"muscle%\",\"muscle kg\",\"arm m\",\"trunk m\",\"leg m\",\"sub fat\",\"arm f\",\"trunk f\",\"leg f\",\"bmi\",\"age\",\"model\"";

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// The first demo scan reproduces the published decomposition
    #[test]
    fn test_demo_first_scan_decomposition() {
        let series = demo_series();
        let first = CompositionCalculator::derive(&series[0]);

        assert_close(first.raw.body_fat_mass.unwrap(), 39.93, 0.01);
        assert_close(first.fat_free_mass.unwrap(), 77.87, 0.01);
        assert_close(first.bone_mass.unwrap(), 5.29, 0.01);
        assert_close(first.total_body_water.unwrap(), 57.00, 0.01);
        assert_close(first.intracellular_water.unwrap(), 35.34, 0.01);
        assert_close(first.extracellular_water.unwrap(), 21.66, 0.01);
        assert_close(first.baseline_ffmi.unwrap(), 25.85, 0.01);

        let view = compute_view(&series, &UserProfile::default(), TimeRange::All);
        let labels = &view.first().unwrap().classification;
        assert_eq!(labels.bmi_category, Some(BmiCategory::SevereObesity));
        assert_eq!(labels.ffmi, Some(FfmiBand::VeryHigh));
        assert_eq!(labels.water_balance, Some(WaterBalance::Normal));
    }

    /// Explicit masses in the export are kept as-is
    #[test]
    fn test_explicit_masses_are_not_recomputed() {
        let series = demo_series();
        assert_eq!(series[1].body_fat_mass, Some(29.1));
        assert_eq!(series[1].skeletal_muscle_mass, Some(32.8));
    }

    #[test]
    fn test_unsorted_export_with_bad_rows() {
        let content = format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n",
            HEADER,
            "\"2024/03/01 07:00\",\"UTC\",\"81.0\",\"20\",\"\"",
            "\"2024/01/01 07:00\",\"UTC\",\"\",\"20\",\"\"",
            "\"not a date\",\"UTC\",\"80.0\",\"20\",\"\"",
            "\"2024/02/01 07:00\",\"UTC\",\"82.0\"",
            "\"2023/12/01 07:00\",\"UTC\",\"83.0\",\"21\",\"\"",
        );

        let series = CsvImporter::new().import_str(&content);
        let weights: Vec<f64> = series.iter().map(|m| m.weight).collect();
        assert_eq!(weights, vec![83.0, 81.0]);
    }

    #[test]
    fn test_equal_timestamps_keep_file_order() {
        let content = format!(
            "{}\n{}\n{}\n{}\n",
            HEADER,
            "\"2024/01/02 07:00\",\"UTC\",\"70.0\",\"\",\"\"",
            "\"2024/01/01 07:00\",\"UTC\",\"71.0\",\"\",\"\"",
            "\"2024/01/01 07:00\",\"UTC\",\"72.0\",\"\",\"\"",
        );

        let series = CsvImporter::new().import_str(&content);
        let weights: Vec<f64> = series.iter().map(|m| m.weight).collect();
        assert_eq!(weights, vec![71.0, 72.0, 70.0]);
    }

    #[test]
    fn test_header_only_and_empty_exports() {
        assert!(CsvImporter::new().import_str("").is_empty());
        assert!(CsvImporter::new().import_str(HEADER).is_empty());

        let view = compute_view(&[], &UserProfile::default(), TimeRange::OneYear);
        assert!(view.is_empty());
        assert!(CompositionReport::generate(&view).assessment.is_none());
    }

    #[test]
    fn test_blank_optional_columns_propagate() {
        let content = format!("{}\n{}\n", HEADER, "\"2024/05/05 06:30\",\"UTC\",\"75.0\",\"\",\"\"");
        let series = CsvImporter::new().import_str(&content);
        let view = compute_view(&series, &UserProfile::default(), TimeRange::All);
        let record = view.latest().unwrap();

        assert_eq!(record.measurement.fat_free_mass, None);
        assert_eq!(record.measurement.total_body_water, None);
        assert_eq!(record.classification.water_balance, None);
        assert_eq!(record.classification.body_fat_status, ReferenceStatus::Unavailable);
        assert_eq!(record.classification.bmi_category, None);
    }

    /// Height override, then clearing it, across the whole view
    #[test]
    fn test_height_override_workflow() {
        let mut engine = Engine::new(MemoryPreferenceStore::new());
        engine.ingest(DEMO_CSV);

        let baseline: Vec<Option<f64>> = engine.view().measurements().map(|m| m.ffmi).collect();

        engine.set_height_text("175").unwrap();
        for m in engine.view().measurements() {
            assert_close(m.ffmi.unwrap(), m.fat_free_mass.unwrap() / (1.75 * 1.75), 1e-12);
        }

        engine.set_height_text("").unwrap();
        let restored: Vec<Option<f64>> = engine.view().measurements().map(|m| m.ffmi).collect();
        assert_eq!(restored, baseline);
        assert_eq!(engine.store().get(HEIGHT_KEY).as_deref(), Some(""));
    }

    #[test]
    fn test_preferences_survive_engine_restart() {
        let mut engine = Engine::new(MemoryPreferenceStore::new());
        engine.set_gender(Gender::Female).unwrap();
        engine.set_height(Some(158.0)).unwrap();

        let store = engine.store().clone();
        assert_eq!(store.get(GENDER_KEY).as_deref(), Some("female"));

        let restarted = Engine::new(store);
        assert_eq!(restarted.profile(), UserProfile::new(Gender::Female, Some(158.0)));
    }

    #[test]
    fn test_ranges_over_demo() {
        let series = demo_series();
        let profile = UserProfile::default();

        assert_eq!(compute_view(&series, &profile, TimeRange::All).len(), 3);
        assert_eq!(compute_view(&series, &profile, TimeRange::OneYear).len(), 1);
        assert_eq!(compute_view(&series, &profile, TimeRange::ThreeMonths).len(), 1);
        assert_eq!(compute_view(&series, &profile, TimeRange::Year(2021)).len(), 1);
        assert!(compute_view(&series, &profile, TimeRange::Year(2022)).is_empty());
    }

    #[test]
    fn test_segmental_totals() {
        let latest = demo_series().pop().unwrap();
        let breakdown = SegmentalEstimator::estimate(&latest);

        let expected_muscle = 99.5
            * (0.46 * 0.237 + 2.0 * 0.06 * 0.343 + 2.0 * 0.18 * 0.492);
        assert_close(breakdown.total_muscle_mass().unwrap(), expected_muscle, 1e-9);

        let grid: Vec<Segment> = breakdown
            .in_order(&Segment::GRID_ORDER)
            .iter()
            .map(|s| s.segment)
            .collect();
        assert_eq!(grid, Segment::GRID_ORDER.to_vec());
    }

    #[test]
    fn test_full_report_over_demo() {
        let view = compute_view(&demo_series(), &UserProfile::default(), TimeRange::All);
        let report = CompositionReport::generate(&view);

        assert_eq!(report.record_count, 3);
        let changes = report.changes.unwrap();
        assert_close(changes.weight, -18.3, 1e-9);

        let assessment = report.assessment.unwrap();
        assert_eq!(assessment.dominant_region, Some(DominantRegion::LowerBody));
        assert_eq!(assessment.body_age_trend, Some(BodyAgeTrend::Improving));

        let muscle_fat = report.muscle_fat.unwrap();
        assert_close(muscle_fat.standard_weight, 1.736 * 1.736 * 22.0, 1e-9);
    }

    #[test]
    fn test_exports_round_trip_through_files() {
        let dir = tempdir().unwrap();
        let view = compute_view(&demo_series(), &UserProfile::new(Gender::Male, Some(180.0)), TimeRange::All);

        let csv_path = dir.path().join("series.csv");
        export::export_series(&view, ExportFormat::Csv, &csv_path).unwrap();
        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let ffmi_column = reader.headers().unwrap().iter().position(|h| h == "FFMI").unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        let exported_ffmi: f64 = rows[0][ffmi_column].parse().unwrap();
        assert_close(exported_ffmi, view.records[0].measurement.ffmi.unwrap(), 1e-9);

        let json_path = dir.path().join("series.json");
        export::export_series(&view, ExportFormat::Json, &json_path).unwrap();
        let parsed: Vec<bodycomp::AnalyzedMeasurement> =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed.len(), view.len());
        for (read_back, original) in parsed.iter().zip(&view.records) {
            assert_eq!(read_back.measurement.raw.timestamp, original.measurement.raw.timestamp);
            assert_eq!(read_back.classification, original.classification);
            assert_close(read_back.measurement.ffmi.unwrap(), original.measurement.ffmi.unwrap(), 1e-9);
        }
    }
}
