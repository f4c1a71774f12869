use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Biological sex used to pick gender-keyed thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

/// User-supplied settings that influence derived values and labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub gender: Gender,

    /// Height in centimeters; `None` means the device estimate is used for FFMI
    pub height_cm: Option<f64>,
}

impl UserProfile {
    pub fn new(gender: Gender, height_cm: Option<f64>) -> Self {
        Self {
            gender,
            height_cm: height_cm.filter(|h| is_valid_height(*h)),
        }
    }

    /// Parse a stored height value. Blank, non-numeric and non-positive input is unset.
    pub fn parse_height(value: &str) -> Option<f64> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|h| is_valid_height(*h))
    }

    /// Height in meters, if a usable height is set
    pub fn height_m(&self) -> Option<f64> {
        self.height_cm
            .filter(|h| is_valid_height(*h))
            .map(|h| h / 100.0)
    }
}

fn is_valid_height(height_cm: f64) -> bool {
    height_cm.is_finite() && height_cm > 0.0
}

/// One exported scan as read from the device file.
///
/// Only `weight` is mandatory. Every other numeric column is `None` when the
/// cell is blank or not a number, which consumers render as a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMeasurement {
    /// Scan instant, interpreted as wall-clock time in the export's timezone
    pub timestamp: NaiveDateTime,

    /// Date portion of the date-time cell, used as display key
    pub date_label: String,

    /// Timezone name exported next to the date-time (informational)
    pub timezone: Option<String>,

    /// Body weight in kilograms
    pub weight: f64,

    pub body_fat_percent: Option<f64>,

    /// Body fat mass in kilograms; backfilled from the percentage when blank
    pub body_fat_mass: Option<f64>,

    /// Device visceral fat level
    pub visceral_fat: Option<f64>,

    /// Basal metabolic rate in kcal
    pub bmr: Option<f64>,

    pub skeletal_muscle_percent: Option<f64>,

    /// Skeletal muscle mass in kilograms; backfilled from the percentage when blank
    pub skeletal_muscle_mass: Option<f64>,

    pub arm_muscle_pct: Option<f64>,
    pub trunk_muscle_pct: Option<f64>,
    pub leg_muscle_pct: Option<f64>,

    /// Whole-body subcutaneous fat percentage
    pub sub_fat_percent: Option<f64>,
    pub arm_fat_pct: Option<f64>,
    pub trunk_fat_pct: Option<f64>,
    pub leg_fat_pct: Option<f64>,

    pub bmi: Option<f64>,

    /// Device-estimated body age in years
    pub body_age: Option<f64>,
}

impl RawMeasurement {
    /// Minimal record carrying only the mandatory fields
    pub fn new(timestamp: NaiveDateTime, weight: f64) -> Self {
        Self {
            timestamp,
            date_label: timestamp.format("%Y/%m/%d").to_string(),
            timezone: None,
            weight,
            body_fat_percent: None,
            body_fat_mass: None,
            visceral_fat: None,
            bmr: None,
            skeletal_muscle_percent: None,
            skeletal_muscle_mass: None,
            arm_muscle_pct: None,
            trunk_muscle_pct: None,
            leg_muscle_pct: None,
            sub_fat_percent: None,
            arm_fat_pct: None,
            trunk_fat_pct: None,
            leg_fat_pct: None,
            bmi: None,
            body_age: None,
        }
    }

    /// Body fat mass, falling back to `weight × percent / 100`
    pub fn effective_body_fat_mass(&self) -> Option<f64> {
        self.body_fat_mass
            .or_else(|| mass_from_percent(self.weight, self.body_fat_percent))
    }

    /// Skeletal muscle mass, falling back to `weight × percent / 100`
    pub fn effective_skeletal_muscle_mass(&self) -> Option<f64> {
        self.skeletal_muscle_mass
            .or_else(|| mass_from_percent(self.weight, self.skeletal_muscle_percent))
    }

    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }
}

fn mass_from_percent(weight: f64, percent: Option<f64>) -> Option<f64> {
    percent.map(|p| weight * (p / 100.0))
}

/// A scan expanded into its full body-composition decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMeasurement {
    #[serde(flatten)]
    pub raw: RawMeasurement,

    /// Weight minus body fat mass (kg)
    pub fat_free_mass: Option<f64>,

    pub bone_mass: Option<f64>,

    /// Fat-free mass excluding bone (kg)
    pub soft_lean_mass: Option<f64>,

    pub total_body_water: Option<f64>,
    pub intracellular_water: Option<f64>,
    pub extracellular_water: Option<f64>,

    pub protein: Option<f64>,

    /// Height-free FFMI estimate obtained through the BMI identity
    pub baseline_ffmi: Option<f64>,

    /// Height-adjusted FFMI when a height is known, otherwise the baseline
    pub ffmi: Option<f64>,
}

impl DerivedMeasurement {
    pub fn timestamp(&self) -> NaiveDateTime {
        self.raw.timestamp
    }

    /// Extracellular to total body water ratio
    pub fn water_ratio(&self) -> Option<f64> {
        match (self.extracellular_water, self.total_body_water) {
            (Some(ecw), Some(tbw)) if tbw != 0.0 => Some(ecw / tbw),
            _ => None,
        }
    }
}
