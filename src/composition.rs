//! Body-composition decomposition
//!
//! Expands a scan into fat-free mass, bone, water compartments and protein
//! using fixed empirical ratios of fat-free mass:
//!
//! - bone = FFM × 0.068
//! - total body water = FFM × 0.732, split 62 % intracellular / 38 % extracellular
//! - protein = FFM − water − bone
//!
//! The ratios are fixed.

use crate::models::{DerivedMeasurement, RawMeasurement};

/// Bone share of fat-free mass
pub const BONE_FRACTION: f64 = 0.068;

/// Water share of fat-free mass
pub const WATER_FRACTION: f64 = 0.732;

/// Intracellular share of total body water
pub const INTRACELLULAR_FRACTION: f64 = 0.62;

/// Extracellular share of total body water
pub const EXTRACELLULAR_FRACTION: f64 = 0.38;

/// Derived-metric calculations
pub struct CompositionCalculator;

impl CompositionCalculator {
    /// Expand one scan. `ffmi` is set to the baseline estimate; height
    /// adjustment happens in [`crate::ffmi`].
    pub fn derive(raw: &RawMeasurement) -> DerivedMeasurement {
        let weight = raw.weight;
        let fat_free_mass = raw.effective_body_fat_mass().map(|fat| weight - fat);

        let bone_mass = fat_free_mass.map(|ffm| ffm * BONE_FRACTION);
        let soft_lean_mass = zip_with(fat_free_mass, bone_mass, |ffm, bone| ffm - bone);
        let total_body_water = fat_free_mass.map(|ffm| ffm * WATER_FRACTION);
        let intracellular_water = total_body_water.map(|tbw| tbw * INTRACELLULAR_FRACTION);
        let extracellular_water = total_body_water.map(|tbw| tbw * EXTRACELLULAR_FRACTION);
        let protein = fat_free_mass
            .zip(total_body_water)
            .zip(bone_mass)
            .map(|((ffm, tbw), bone)| ffm - tbw - bone);

        let baseline_ffmi = Self::baseline_ffmi(weight, raw.bmi, fat_free_mass);

        DerivedMeasurement {
            raw: raw.clone(),
            fat_free_mass,
            bone_mass,
            soft_lean_mass,
            total_body_water,
            intracellular_water,
            extracellular_water,
            protein,
            baseline_ffmi,
            ffmi: baseline_ffmi,
        }
    }

    /// Expand a whole series, preserving order
    pub fn derive_series(series: &[RawMeasurement]) -> Vec<DerivedMeasurement> {
        series.iter().map(Self::derive).collect()
    }

    /// Height-free FFMI: since `bmi = weight / h²`, `FFM / h² = FFM × bmi / weight`.
    ///
    /// Yields `0` when weight or BMI is not positive (or BMI is blank), and
    /// blank only when fat-free mass itself is unknown.
    pub fn baseline_ffmi(weight: f64, bmi: Option<f64>, fat_free_mass: Option<f64>) -> Option<f64> {
        match bmi {
            Some(bmi) if weight > 0.0 && bmi > 0.0 => fat_free_mass.map(|ffm| (ffm * bmi) / weight),
            _ => Some(0.0),
        }
    }
}

fn zip_with(a: Option<f64>, b: Option<f64>, f: impl FnOnce(f64, f64) -> f64) -> Option<f64> {
    a.zip(b).map(|(a, b)| f(a, b))
}
