//! Segmental muscle and fat estimation
//!
//! The scale reports one muscle and one fat percentage per region (trunk,
//! arms, legs). Absolute masses are estimated by assuming each segment carries
//! a fixed share of body weight:
//!
//! | Segment | Share of weight |
//! |---|---|
//! | Trunk | 0.46 |
//! | Each arm | 0.06 |
//! | Each leg | 0.18 |
//!
//! The shares add up to 0.94; the remaining 0.06 (head and neck) is not
//! attributed to any segment. Left and right sides are mirrored because the
//! source percentages have no side distinction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::RawMeasurement;

pub const TRUNK_FRACTION: f64 = 0.46;
pub const ARM_FRACTION: f64 = 0.06;
pub const LEG_FRACTION: f64 = 0.18;

/// Share of body weight outside all segments
pub const UNATTRIBUTED_FRACTION: f64 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Trunk,
    LeftArm,
    LeftLeg,
    RightLeg,
    RightArm,
}

impl Segment {
    /// Canonical order of [`SegmentalBreakdown::segments`]
    pub const ORDER: [Segment; 5] = [
        Segment::Trunk,
        Segment::LeftArm,
        Segment::LeftLeg,
        Segment::RightLeg,
        Segment::RightArm,
    ];

    /// Body-map layout: left leg, left arm, trunk, right arm, right leg
    pub const GRID_ORDER: [Segment; 5] = [
        Segment::LeftLeg,
        Segment::LeftArm,
        Segment::Trunk,
        Segment::RightArm,
        Segment::RightLeg,
    ];

    /// Share of total body weight attributed to this segment
    pub fn mass_fraction(&self) -> f64 {
        match self {
            Segment::Trunk => TRUNK_FRACTION,
            Segment::LeftArm | Segment::RightArm => ARM_FRACTION,
            Segment::LeftLeg | Segment::RightLeg => LEG_FRACTION,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::Trunk => "Trunk",
            Segment::LeftArm => "Left arm",
            Segment::LeftLeg => "Left leg",
            Segment::RightLeg => "Right leg",
            Segment::RightArm => "Right arm",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Muscle and fat estimate for one segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentEstimate {
    pub segment: Segment,
    pub muscle_pct: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub fat_pct: Option<f64>,
    pub fat_mass: Option<f64>,
}

/// Five-segment breakdown in [`Segment::ORDER`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentalBreakdown {
    pub segments: [SegmentEstimate; 5],
}

impl SegmentalBreakdown {
    pub fn get(&self, segment: Segment) -> &SegmentEstimate {
        // ORDER and `segments` share indices
        let index = Segment::ORDER
            .iter()
            .position(|s| *s == segment)
            .unwrap_or_default();
        &self.segments[index]
    }

    /// Estimates rearranged for presentation; values are untouched
    pub fn in_order(&self, order: &[Segment]) -> Vec<SegmentEstimate> {
        order.iter().map(|s| *self.get(*s)).collect()
    }

    pub fn total_muscle_mass(&self) -> Option<f64> {
        self.segments.iter().map(|s| s.muscle_mass).sum()
    }

    pub fn total_fat_mass(&self) -> Option<f64> {
        self.segments.iter().map(|s| s.fat_mass).sum()
    }
}

/// Segment mass estimation from whole-region percentages
pub struct SegmentalEstimator;

impl SegmentalEstimator {
    pub fn estimate(measurement: &RawMeasurement) -> SegmentalBreakdown {
        let segments = Segment::ORDER.map(|segment| {
            let (muscle_pct, fat_pct) = Self::region_percentages(measurement, segment);
            let segment_weight = segment.mass_fraction() * measurement.weight;

            SegmentEstimate {
                segment,
                muscle_pct,
                muscle_mass: muscle_pct.map(|pct| segment_weight * (pct / 100.0)),
                fat_pct,
                fat_mass: fat_pct.map(|pct| segment_weight * (pct / 100.0)),
            }
        });

        SegmentalBreakdown { segments }
    }

    fn region_percentages(m: &RawMeasurement, segment: Segment) -> (Option<f64>, Option<f64>) {
        match segment {
            Segment::Trunk => (m.trunk_muscle_pct, m.trunk_fat_pct),
            Segment::LeftArm | Segment::RightArm => (m.arm_muscle_pct, m.arm_fat_pct),
            Segment::LeftLeg | Segment::RightLeg => (m.leg_muscle_pct, m.leg_fat_pct),
        }
    }
}
