//! Analytics engine
//!
//! The engine owns the immutable inputs (raw series, user profile, selected
//! time range) and recomputes the view from scratch through [`compute_view`]
//! whenever the host asks for it. Nothing is patched incrementally.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::classification::{Classification, ClassificationEngine};
use crate::composition::CompositionCalculator;
use crate::error::{PreferenceError, Result};
use crate::ffmi;
use crate::import::{validation::MeasurementValidator, CsvImporter, ImportFormat};
use crate::models::{DerivedMeasurement, Gender, RawMeasurement, UserProfile};
use crate::preferences::{self, PreferenceStore};
use crate::range::TimeRange;
use crate::reference::MuscleFatAnalysis;
use crate::report::ChangeSummary;
use crate::segmental::{SegmentalBreakdown, SegmentalEstimator};

/// A derived record together with its labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedMeasurement {
    pub measurement: DerivedMeasurement,
    pub classification: Classification,
}

/// Filtered, height-normalised and classified series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedView {
    pub range: TimeRange,
    pub profile: UserProfile,
    /// Size of the unfiltered series
    pub total_records: usize,
    pub records: Vec<AnalyzedMeasurement>,
}

impl DerivedView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Earliest record in the range, the baseline for change-since-start
    pub fn first(&self) -> Option<&AnalyzedMeasurement> {
        self.records.first()
    }

    pub fn latest(&self) -> Option<&AnalyzedMeasurement> {
        self.records.last()
    }

    pub fn measurements(&self) -> impl Iterator<Item = &DerivedMeasurement> {
        self.records.iter().map(|r| &r.measurement)
    }

    pub fn changes(&self) -> Option<ChangeSummary> {
        let first = self.first()?;
        let latest = self.latest()?;
        Some(ChangeSummary::between(&first.measurement, &latest.measurement))
    }

    /// Segment masses of the latest record
    pub fn segmental(&self) -> Option<SegmentalBreakdown> {
        self.latest()
            .map(|r| SegmentalEstimator::estimate(&r.measurement.raw))
    }

    pub fn muscle_fat(&self) -> Option<MuscleFatAnalysis> {
        self.latest()
            .map(|r| MuscleFatAnalysis::analyze(&r.measurement, &self.profile))
    }
}

/// Derive, select, normalise and classify.
///
/// Pure: the same inputs always produce an identical view.
pub fn compute_view(
    series: &[RawMeasurement],
    profile: &UserProfile,
    range: TimeRange,
) -> DerivedView {
    let derived = CompositionCalculator::derive_series(series);
    let selected = range.select(&derived);

    let records = ffmi::normalize_series(selected, profile.height_cm)
        .into_iter()
        .map(|measurement| {
            let classification = ClassificationEngine::classify(&measurement, profile.gender);
            AnalyzedMeasurement {
                measurement,
                classification,
            }
        })
        .collect();

    DerivedView {
        range,
        profile: *profile,
        total_records: series.len(),
        records,
    }
}

/// Holds the engine inputs and the injected preference store
pub struct Engine<S: PreferenceStore> {
    store: S,
    series: Vec<RawMeasurement>,
    profile: UserProfile,
    range: TimeRange,
}

impl<S: PreferenceStore> Engine<S> {
    /// Build an engine, loading gender and height from `store`
    pub fn new(store: S) -> Self {
        let profile = preferences::load_profile(&store);
        info!(gender = %profile.gender, height_cm = ?profile.height_cm, "Loaded preferences");

        Self {
            store,
            series: Vec::new(),
            profile,
            range: TimeRange::default(),
        }
    }

    /// Parse an export and replace the series with it. Returns the new length.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub fn ingest(&mut self, content: &str) -> usize {
        let parsed = CsvImporter::new().import_str(content);
        self.replace_series(parsed);
        self.series.len()
    }

    /// Read a file completely, then ingest it. A failed read leaves the
    /// current series untouched.
    pub fn ingest_file(&mut self, path: &Path) -> Result<usize> {
        let parsed = CsvImporter::new().import_file(path)?;
        self.replace_series(parsed);
        Ok(self.series.len())
    }

    /// Swap in a complete series; no merge with the previous one
    pub fn replace_series(&mut self, mut series: Vec<RawMeasurement>) {
        MeasurementValidator::sort_series(&mut series);
        info!(records = series.len(), previous = self.series.len(), "Replaced measurement series");
        self.series = series;
    }

    pub fn series(&self) -> &[RawMeasurement] {
        &self.series
    }

    pub fn profile(&self) -> UserProfile {
        self.profile
    }

    pub fn time_range(&self) -> TimeRange {
        self.range
    }

    pub fn set_time_range(&mut self, range: TimeRange) {
        self.range = range;
    }

    /// Change gender and write it back to the store.
    ///
    /// The in-memory profile changes even when persisting fails.
    pub fn set_gender(&mut self, gender: Gender) -> std::result::Result<(), PreferenceError> {
        self.profile.gender = gender;
        self.persist()
    }

    /// Change height; `None` or an unusable value clears it
    pub fn set_height(&mut self, height_cm: Option<f64>) -> std::result::Result<(), PreferenceError> {
        self.profile = UserProfile::new(self.profile.gender, height_cm);
        self.persist()
    }

    /// Change height from free text, as typed into a form field
    pub fn set_height_text(&mut self, value: &str) -> std::result::Result<(), PreferenceError> {
        self.set_height(UserProfile::parse_height(value))
    }

    /// Current view over all inputs
    pub fn view(&self) -> DerivedView {
        compute_view(&self.series, &self.profile, self.range)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) -> std::result::Result<(), PreferenceError> {
        preferences::save_profile(&mut self.store, &self.profile).map_err(|e| {
            warn!(error = %e, "Failed to persist preferences");
            e
        })
    }
}
