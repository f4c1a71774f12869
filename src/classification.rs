use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{DerivedMeasurement, Gender};
use crate::reference::ReferenceStandard;

/// Placeholder rendered for a label that cannot be determined
pub const PLACEHOLDER: &str = "-";

/// Muscularity band for a Fat-Free Mass Index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FfmiBand {
    BelowAverage,
    LowMuscle,
    Average,
    AboveAverage,
    NotablyHigh,
    VeryHigh,
    SuspectedEnhancement,
    NaturalLimit,
}

impl FfmiBand {
    pub fn label(&self) -> &'static str {
        match self {
            FfmiBand::BelowAverage => "below average",
            FfmiBand::LowMuscle => "low muscle",
            FfmiBand::Average => "average",
            FfmiBand::AboveAverage => "above average",
            FfmiBand::NotablyHigh => "notably high",
            FfmiBand::VeryHigh => "very high",
            FfmiBand::SuspectedEnhancement => "suspected enhancement",
            FfmiBand::NaturalLimit => "natural limit",
        }
    }
}

/// Upper-exclusive FFMI cut points, men
const MALE_FFMI_BANDS: [(f64, FfmiBand); 7] = [
    (16.0, FfmiBand::BelowAverage),
    (18.0, FfmiBand::LowMuscle),
    (20.0, FfmiBand::Average),
    (22.0, FfmiBand::AboveAverage),
    (23.0, FfmiBand::NotablyHigh),
    (26.0, FfmiBand::VeryHigh),
    (28.0, FfmiBand::SuspectedEnhancement),
];

/// Upper-exclusive FFMI cut points, women
const FEMALE_FFMI_BANDS: [(f64, FfmiBand); 5] = [
    (13.0, FfmiBand::BelowAverage),
    (15.0, FfmiBand::LowMuscle),
    (17.0, FfmiBand::Average),
    (19.0, FfmiBand::AboveAverage),
    (22.0, FfmiBand::VeryHigh),
];

/// BMI category (gender independent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    MildObesity,
    ModerateObesity,
    SevereObesity,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::MildObesity => "mild obesity",
            BmiCategory::ModerateObesity => "moderate obesity",
            BmiCategory::SevereObesity => "severe obesity",
        }
    }
}

const BMI_BANDS: [(f64, BmiCategory); 5] = [
    (18.5, BmiCategory::Underweight),
    (24.0, BmiCategory::Normal),
    (27.0, BmiCategory::Overweight),
    (30.0, BmiCategory::MildObesity),
    (35.0, BmiCategory::ModerateObesity),
];

/// Fluid balance from the extracellular / total water ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterBalance {
    Dehydrated,
    Normal,
    MildEdema,
    Edema,
}

impl WaterBalance {
    pub fn label(&self) -> &'static str {
        match self {
            WaterBalance::Dehydrated => "dehydration",
            WaterBalance::Normal => "normal",
            WaterBalance::MildEdema => "mild edema",
            WaterBalance::Edema => "edema",
        }
    }
}

/// Status against a gender-keyed reference threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStatus {
    Low,
    Normal,
    Elevated,
    /// Value missing or zero
    Unavailable,
}

impl ReferenceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceStatus::Low => "low",
            ReferenceStatus::Normal => "normal",
            ReferenceStatus::Elevated => "elevated",
            ReferenceStatus::Unavailable => PLACEHOLDER,
        }
    }
}

/// Overall body-type judgement from BMI and body fat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    Standard,
    MuscularOverweight,
    ExcessFat,
    Obese,
}

impl BodyType {
    pub fn label(&self) -> &'static str {
        match self {
            BodyType::Standard => "standard",
            BodyType::MuscularOverweight => "muscular overweight",
            BodyType::ExcessFat => "excess fat",
            BodyType::Obese => "obese",
        }
    }
}

/// Health risk implied by the device visceral fat level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisceralRisk {
    Normal,
    Elevated,
    VeryHigh,
}

impl VisceralRisk {
    pub fn label(&self) -> &'static str {
        match self {
            VisceralRisk::Normal => "normal",
            VisceralRisk::Elevated => "elevated",
            VisceralRisk::VeryHigh => "very high risk",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(FfmiBand, BmiCategory, WaterBalance, ReferenceStatus, BodyType, VisceralRisk);

/// Every label attached to one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub ffmi: Option<FfmiBand>,
    /// 1-based rank of the FFMI band within the gender's table
    pub ffmi_score: Option<u8>,
    pub bmi_category: Option<BmiCategory>,
    pub water_balance: Option<WaterBalance>,
    pub body_fat_status: ReferenceStatus,
    pub bmi_status: ReferenceStatus,
    pub visceral_fat_status: ReferenceStatus,
    pub skeletal_muscle_status: ReferenceStatus,
    pub body_type: Option<BodyType>,
    pub visceral_risk: Option<VisceralRisk>,
}

/// Rule tables mapping scalar metrics to labels.
///
/// All scalar functions are total over the reals and use upper-exclusive
/// bounds (`value < cut` selects the lower band) unless documented otherwise.
pub struct ClassificationEngine;

impl ClassificationEngine {
    /// FFMI band; a value equal to a cut point belongs to the upper band
    pub fn ffmi_band(ffmi: f64, gender: Gender) -> FfmiBand {
        let (_, band) = Self::rank(ffmi, Self::ffmi_table(gender), FfmiBand::NaturalLimit);
        band
    }

    /// 1-based rank of the FFMI band for the gender
    pub fn ffmi_score(ffmi: f64, gender: Gender) -> u8 {
        let (rank, _) = Self::rank(ffmi, Self::ffmi_table(gender), FfmiBand::NaturalLimit);
        rank
    }

    pub fn bmi_category(bmi: f64) -> BmiCategory {
        let (_, category) = Self::rank(bmi, &BMI_BANDS, BmiCategory::SevereObesity);
        category
    }

    /// Fluid balance; a blank or zero ratio has no label.
    ///
    /// Bounds here are inclusive above the dehydration cut: `0.390` is still normal.
    pub fn water_balance(ratio: Option<f64>) -> Option<WaterBalance> {
        let ratio = present(ratio)?;
        Some(if ratio < 0.360 {
            WaterBalance::Dehydrated
        } else if ratio <= 0.390 {
            WaterBalance::Normal
        } else if ratio <= 0.400 {
            WaterBalance::MildEdema
        } else {
            WaterBalance::Edema
        })
    }

    pub fn body_fat_status(body_fat_percent: Option<f64>, gender: Gender) -> ReferenceStatus {
        let standard = ReferenceStandard::for_gender(gender);
        Self::upper_status(body_fat_percent, standard.body_fat.normal_top)
    }

    pub fn bmi_status(bmi: Option<f64>, gender: Gender) -> ReferenceStatus {
        let standard = ReferenceStandard::for_gender(gender);
        Self::upper_status(bmi, standard.bmi_normal_top)
    }

    pub fn visceral_fat_status(level: Option<f64>, gender: Gender) -> ReferenceStatus {
        let standard = ReferenceStandard::for_gender(gender);
        Self::upper_status(level, standard.visceral_fat.normal_top)
    }

    /// Skeletal muscle is judged from below: under `low_top` is low
    pub fn skeletal_muscle_status(percent: Option<f64>, gender: Gender) -> ReferenceStatus {
        let standard = ReferenceStandard::for_gender(gender);
        match present(percent) {
            None => ReferenceStatus::Unavailable,
            Some(p) if p < standard.skeletal_muscle.low_top => ReferenceStatus::Low,
            Some(p) if p < standard.skeletal_muscle.normal_top => ReferenceStatus::Normal,
            Some(_) => ReferenceStatus::Elevated,
        }
    }

    /// Body type; BMI bounds here are exclusive from above (`bmi > 30`)
    pub fn body_type(bmi: Option<f64>, body_fat_percent: Option<f64>) -> Option<BodyType> {
        let bmi = present(bmi)?;
        Some(if bmi > 30.0 {
            BodyType::Obese
        } else if bmi > 24.0 {
            if body_fat_percent.is_some_and(|fat| fat > 25.0) {
                BodyType::ExcessFat
            } else {
                BodyType::MuscularOverweight
            }
        } else {
            BodyType::Standard
        })
    }

    pub fn visceral_risk(level: Option<f64>) -> Option<VisceralRisk> {
        let level = level?;
        Some(if level > 15.0 {
            VisceralRisk::VeryHigh
        } else if level > 9.0 {
            VisceralRisk::Elevated
        } else {
            VisceralRisk::Normal
        })
    }

    /// Label every metric of a record
    pub fn classify(record: &DerivedMeasurement, gender: Gender) -> Classification {
        let raw = &record.raw;

        Classification {
            ffmi: record.ffmi.map(|v| Self::ffmi_band(v, gender)),
            ffmi_score: record.ffmi.map(|v| Self::ffmi_score(v, gender)),
            bmi_category: present(raw.bmi).map(Self::bmi_category),
            water_balance: Self::water_balance(record.water_ratio()),
            body_fat_status: Self::body_fat_status(raw.body_fat_percent, gender),
            bmi_status: Self::bmi_status(raw.bmi, gender),
            visceral_fat_status: Self::visceral_fat_status(raw.visceral_fat, gender),
            skeletal_muscle_status: Self::skeletal_muscle_status(raw.skeletal_muscle_percent, gender),
            body_type: Self::body_type(raw.bmi, raw.body_fat_percent),
            visceral_risk: Self::visceral_risk(raw.visceral_fat),
        }
    }

    fn ffmi_table(gender: Gender) -> &'static [(f64, FfmiBand)] {
        match gender {
            Gender::Male => &MALE_FFMI_BANDS,
            Gender::Female => &FEMALE_FFMI_BANDS,
        }
    }

    /// First band whose cut exceeds `value`, with its 1-based rank
    fn rank<T: Copy>(value: f64, bands: &[(f64, T)], top: T) -> (u8, T) {
        bands
            .iter()
            .enumerate()
            .find(|(_, (cut, _))| value < *cut)
            .map(|(i, (_, band))| (i as u8 + 1, *band))
            .unwrap_or((bands.len() as u8 + 1, top))
    }

    fn upper_status(value: Option<f64>, normal_top: f64) -> ReferenceStatus {
        match present(value) {
            None => ReferenceStatus::Unavailable,
            Some(v) if v < normal_top => ReferenceStatus::Normal,
            Some(_) => ReferenceStatus::Elevated,
        }
    }
}

/// Zero counts as missing for device-reported metrics
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}
