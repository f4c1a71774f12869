//! Reference standards
//!
//! Gender-keyed thresholds published with consumer body-composition scales,
//! and the muscle-fat "percent of standard" analysis built on an ideal weight
//! at BMI 22.

use serde::{Deserialize, Serialize};

use crate::models::{DerivedMeasurement, Gender, UserProfile};

/// Thresholds where higher values are worse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpperThresholds {
    pub normal_top: f64,
    pub high_top: f64,
}

/// Thresholds where lower values are worse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowerThresholds {
    pub low_top: f64,
    pub normal_top: f64,
}

/// Reference table for one gender
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStandard {
    pub body_fat: UpperThresholds,
    pub visceral_fat: UpperThresholds,
    pub skeletal_muscle: LowerThresholds,
    /// Top of the normal BMI band
    pub bmi_normal_top: f64,
}

pub const MALE_STANDARD: ReferenceStandard = ReferenceStandard {
    body_fat: UpperThresholds {
        normal_top: 20.0,
        high_top: 25.0,
    },
    visceral_fat: UpperThresholds {
        normal_top: 9.0,
        high_top: 14.0,
    },
    skeletal_muscle: LowerThresholds {
        low_top: 32.8,
        normal_top: 35.7,
    },
    bmi_normal_top: 24.0,
};

pub const FEMALE_STANDARD: ReferenceStandard = ReferenceStandard {
    body_fat: UpperThresholds {
        normal_top: 30.0,
        high_top: 35.0,
    },
    visceral_fat: UpperThresholds {
        normal_top: 9.0,
        high_top: 14.0,
    },
    skeletal_muscle: LowerThresholds {
        low_top: 25.8,
        normal_top: 27.9,
    },
    bmi_normal_top: 24.0,
};

impl ReferenceStandard {
    pub fn for_gender(gender: Gender) -> &'static ReferenceStandard {
        match gender {
            Gender::Male => &MALE_STANDARD,
            Gender::Female => &FEMALE_STANDARD,
        }
    }
}

/// Height assumed for the standard weight when none is set
pub const DEFAULT_REFERENCE_HEIGHT_CM: f64 = 173.6;

/// BMI of the standard weight
pub const STANDARD_BMI: f64 = 22.0;

/// Position of a value against its normal band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarStatus {
    Under,
    Normal,
    Over,
}

/// Display scale and normal band for one bar, in percent of standard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarScale {
    pub min: f64,
    pub max: f64,
    pub low_normal: f64,
    pub high_normal: f64,
}

impl BarScale {
    pub const WEIGHT: BarScale = BarScale {
        min: 50.0,
        max: 200.0,
        low_normal: 85.0,
        high_normal: 115.0,
    };

    pub const MUSCLE: BarScale = BarScale {
        min: 60.0,
        max: 180.0,
        low_normal: 90.0,
        high_normal: 110.0,
    };

    pub const FAT: BarScale = BarScale {
        min: 50.0,
        max: 400.0,
        low_normal: 80.0,
        high_normal: 160.0,
    };

    /// Position of `percent` on the scale, clamped to 0..=100
    pub fn position(&self, percent: f64) -> f64 {
        (((percent - self.min) / (self.max - self.min)) * 100.0).clamp(0.0, 100.0)
    }
}

/// One row of the muscle-fat analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardBar {
    pub value: Option<f64>,
    /// 100 % reference in kilograms
    pub standard: f64,
    pub percent_of_standard: Option<f64>,
    /// Normal range in kilograms
    pub normal_range: (f64, f64),
    pub status: Option<BarStatus>,
    pub scale: BarScale,
}

impl StandardBar {
    pub fn new(value: Option<f64>, standard: f64, scale: BarScale) -> Self {
        let standard = if standard > 0.0 { standard } else { 1.0 };
        let percent_of_standard = value.map(|v| (v / standard) * 100.0);
        let status = percent_of_standard.map(|pct| {
            if pct < scale.low_normal {
                BarStatus::Under
            } else if pct <= scale.high_normal {
                BarStatus::Normal
            } else {
                BarStatus::Over
            }
        });

        Self {
            value,
            standard,
            percent_of_standard,
            normal_range: (
                standard * (scale.low_normal / 100.0),
                standard * (scale.high_normal / 100.0),
            ),
            status,
            scale,
        }
    }
}

/// Weight, skeletal muscle and fat mass against height-based standards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleFatAnalysis {
    pub reference_height_cm: f64,
    pub standard_weight: f64,
    pub weight: StandardBar,
    pub skeletal_muscle: StandardBar,
    pub body_fat: StandardBar,
}

impl MuscleFatAnalysis {
    pub fn analyze(record: &DerivedMeasurement, profile: &UserProfile) -> Self {
        let reference_height_cm = profile
            .height_cm
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(DEFAULT_REFERENCE_HEIGHT_CM);
        let height_m = reference_height_cm / 100.0;
        let standard_weight = height_m * height_m * STANDARD_BMI;

        let (muscle_share, fat_share) = match profile.gender {
            Gender::Male => (0.45, 0.15),
            Gender::Female => (0.39, 0.23),
        };

        Self {
            reference_height_cm,
            standard_weight,
            weight: StandardBar::new(Some(record.raw.weight), standard_weight, BarScale::WEIGHT),
            skeletal_muscle: StandardBar::new(
                record.raw.effective_skeletal_muscle_mass(),
                standard_weight * muscle_share,
                BarScale::MUSCLE,
            ),
            body_fat: StandardBar::new(
                record.raw.effective_body_fat_mass(),
                standard_weight * fat_share,
                BarScale::FAT,
            ),
        }
    }
}
