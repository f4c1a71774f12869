//! Change-since-start deltas and the comprehensive assessment
//!
//! Everything here is computed from a [`DerivedView`], so it always follows
//! the selected time range, gender and height.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classification::{BmiCategory, BodyType, Classification, ClassificationEngine, VisceralRisk};
use crate::engine::DerivedView;
use crate::models::{DerivedMeasurement, UserProfile};
use crate::range::TimeRange;
use crate::reference::MuscleFatAnalysis;
use crate::segmental::SegmentalBreakdown;

/// `latest − first` for the headline metrics; `None` if either side is blank
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub ffmi: Option<f64>,
    pub weight: f64,
    pub body_fat_percent: Option<f64>,
    pub skeletal_muscle_percent: Option<f64>,
    pub visceral_fat: Option<f64>,
    pub bmi: Option<f64>,
}

impl ChangeSummary {
    pub fn between(first: &DerivedMeasurement, latest: &DerivedMeasurement) -> Self {
        Self {
            ffmi: delta(first.ffmi, latest.ffmi),
            weight: latest.raw.weight - first.raw.weight,
            body_fat_percent: delta(first.raw.body_fat_percent, latest.raw.body_fat_percent),
            skeletal_muscle_percent: delta(
                first.raw.skeletal_muscle_percent,
                latest.raw.skeletal_muscle_percent,
            ),
            visceral_fat: delta(first.raw.visceral_fat, latest.raw.visceral_fat),
            bmi: delta(first.raw.bmi, latest.raw.bmi),
        }
    }
}

fn delta(first: Option<f64>, latest: Option<f64>) -> Option<f64> {
    first.zip(latest).map(|(a, b)| b - a)
}

/// Limb group carrying the larger muscle share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantRegion {
    LowerBody,
    UpperBody,
}

impl fmt::Display for DominantRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DominantRegion::LowerBody => write!(f, "lower body"),
            DominantRegion::UpperBody => write!(f, "upper body"),
        }
    }
}

/// Direction of the device body-age estimate over the range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyAgeTrend {
    Improving,
    Steady,
}

impl fmt::Display for BodyAgeTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyAgeTrend::Improving => write!(f, "improving"),
            BodyAgeTrend::Steady => write!(f, "steady"),
        }
    }
}

/// Narrative summary of the latest scan against the first one in range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    pub body_type: Option<BodyType>,
    pub weight_change: f64,
    pub skeletal_muscle_percent: Option<f64>,
    pub dominant_region: Option<DominantRegion>,
    pub bmr: Option<f64>,
    pub body_age: Option<f64>,
    pub body_age_trend: Option<BodyAgeTrend>,
    pub visceral_fat: Option<f64>,
    pub visceral_risk: Option<VisceralRisk>,
}

impl Assessment {
    pub fn assess(first: &DerivedMeasurement, latest: &DerivedMeasurement) -> Self {
        let raw = &latest.raw;

        let dominant_region = raw
            .leg_muscle_pct
            .zip(raw.arm_muscle_pct)
            .map(|(leg, arm)| {
                if leg > arm {
                    DominantRegion::LowerBody
                } else {
                    DominantRegion::UpperBody
                }
            });

        let body_age_trend = first
            .raw
            .body_age
            .zip(raw.body_age)
            .map(|(start, now)| {
                if now < start {
                    BodyAgeTrend::Improving
                } else {
                    BodyAgeTrend::Steady
                }
            });

        Self {
            bmi: raw.bmi,
            bmi_category: raw.bmi.filter(|b| *b != 0.0).map(ClassificationEngine::bmi_category),
            body_type: ClassificationEngine::body_type(raw.bmi, raw.body_fat_percent),
            weight_change: raw.weight - first.raw.weight,
            skeletal_muscle_percent: raw.skeletal_muscle_percent,
            dominant_region,
            bmr: raw.bmr,
            body_age: raw.body_age,
            body_age_trend,
            visceral_fat: raw.visceral_fat,
            visceral_risk: ClassificationEngine::visceral_risk(raw.visceral_fat),
        }
    }
}

/// Everything a host needs to render the dashboard for one view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionReport {
    pub generated_at: NaiveDateTime,
    pub range: TimeRange,
    pub profile: UserProfile,
    pub record_count: usize,
    pub total_records: usize,
    pub first: Option<DerivedMeasurement>,
    pub latest: Option<DerivedMeasurement>,
    pub labels: Option<Classification>,
    pub changes: Option<ChangeSummary>,
    pub segmental: Option<SegmentalBreakdown>,
    pub muscle_fat: Option<MuscleFatAnalysis>,
    pub assessment: Option<Assessment>,
}

impl CompositionReport {
    pub fn generate(view: &DerivedView) -> Self {
        Self::generate_at(view, Local::now().naive_local())
    }

    pub fn generate_at(view: &DerivedView, generated_at: NaiveDateTime) -> Self {
        let first = view.first().map(|r| r.measurement.clone());
        let latest = view.latest();

        let assessment = first
            .as_ref()
            .zip(latest)
            .map(|(first, latest)| Assessment::assess(first, &latest.measurement));

        Self {
            generated_at,
            range: view.range,
            profile: view.profile,
            record_count: view.len(),
            total_records: view.total_records,
            labels: latest.map(|r| r.classification.clone()),
            latest: latest.map(|r| r.measurement.clone()),
            first,
            changes: view.changes(),
            segmental: view.segmental(),
            muscle_fat: view.muscle_fat(),
            assessment,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
