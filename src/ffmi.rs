//! Height normalisation of the Fat-Free Mass Index
//!
//! The device export carries no height, so the baseline FFMI is recovered from
//! BMI. When the user supplies a height the index is recomputed directly as
//! `FFM / height_m²` and overrides the baseline.

use crate::models::DerivedMeasurement;

/// `FFM / (height_cm / 100)²`
pub fn height_adjusted_ffmi(fat_free_mass: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    fat_free_mass / (height_m * height_m)
}

/// FFMI for a record given an optional height.
///
/// Heights that are missing, non-finite or not positive fall back to the baseline.
pub fn resolve_ffmi(record: &DerivedMeasurement, height_cm: Option<f64>) -> Option<f64> {
    match height_cm.filter(|h| h.is_finite() && *h > 0.0) {
        Some(height) => record
            .fat_free_mass
            .map(|ffm| height_adjusted_ffmi(ffm, height)),
        None => record.baseline_ffmi,
    }
}

/// Copy of `record` with `ffmi` resolved for `height_cm`
pub fn normalize(record: &DerivedMeasurement, height_cm: Option<f64>) -> DerivedMeasurement {
    DerivedMeasurement {
        ffmi: resolve_ffmi(record, height_cm),
        ..record.clone()
    }
}

/// Normalise every record of a view
pub fn normalize_series(
    records: &[DerivedMeasurement],
    height_cm: Option<f64>,
) -> Vec<DerivedMeasurement> {
    records.iter().map(|r| normalize(r, height_cm)).collect()
}
