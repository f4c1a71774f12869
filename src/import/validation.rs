use crate::models::RawMeasurement;

/// Validate and complete freshly parsed measurements
pub struct MeasurementValidator;

impl MeasurementValidator {
    /// Weight is the only column whose absence discards a row
    pub fn has_usable_weight(weight: Option<f64>) -> Option<f64> {
        weight.filter(|w| w.is_finite())
    }

    /// Fill blank fat and muscle masses from their percentages.
    ///
    /// Must run before anything derives from the record so every consumer sees
    /// the same masses.
    pub fn backfill_masses(measurement: &mut RawMeasurement) {
        if measurement.body_fat_mass.is_none() {
            measurement.body_fat_mass = measurement.effective_body_fat_mass();
        }
        if measurement.skeletal_muscle_mass.is_none() {
            measurement.skeletal_muscle_mass = measurement.effective_skeletal_muscle_mass();
        }
    }

    /// Stable ascending sort by timestamp; equal timestamps keep input order
    pub fn sort_series(series: &mut [RawMeasurement]) {
        series.sort_by_key(|m| m.timestamp);
    }
}
