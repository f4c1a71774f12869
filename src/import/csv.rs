use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::{debug, info};

use crate::error::ImportError;
use crate::import::{validation::MeasurementValidator, ImportFormat};
use crate::models::RawMeasurement;

/// Fixed column positions of the scale export
pub mod column {
    pub const DATE_TIME: usize = 0;
    pub const TIMEZONE: usize = 1;
    pub const WEIGHT: usize = 2;
    pub const BODY_FAT_PERCENT: usize = 3;
    pub const BODY_FAT_MASS: usize = 4;
    pub const VISCERAL_FAT: usize = 5;
    pub const BMR: usize = 6;
    pub const SKELETAL_MUSCLE_PERCENT: usize = 7;
    pub const SKELETAL_MUSCLE_MASS: usize = 8;
    pub const ARM_MUSCLE_PCT: usize = 9;
    pub const TRUNK_MUSCLE_PCT: usize = 10;
    pub const LEG_MUSCLE_PCT: usize = 11;
    pub const SUB_FAT_PERCENT: usize = 12;
    pub const ARM_FAT_PCT: usize = 13;
    pub const TRUNK_FAT_PCT: usize = 14;
    pub const LEG_FAT_PCT: usize = 15;
    pub const BMI: usize = 16;
    pub const BODY_AGE: usize = 17;
    // 18 is the device model id, ignored
}

/// Rows shorter than this are discarded
pub const MIN_FIELDS: usize = 5;

/// CSV importer for positional body-composition scale exports
#[derive(Debug, Default)]
pub struct CsvImporter;

impl CsvImporter {
    pub fn new() -> Self {
        Self
    }

    fn parse_datetime(date_str: &str) -> Option<NaiveDateTime> {
        let formats = [
            "%Y/%m/%d %H:%M",
            "%Y/%m/%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
        ];

        for format in &formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
                return Some(dt);
            }
        }

        // Date-only cells land at midnight
        ["%Y/%m/%d", "%Y-%m-%d"]
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(date_str, format).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }

    /// Lenient number parse: blank or non-numeric cells become `None`
    pub fn parse_metric(value: Option<&str>) -> Option<f64> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// Remove every double quote from each field. Quotes are decoration in
    /// these exports and never delimit a field.
    fn strip_quotes(record: &StringRecord) -> StringRecord {
        record
            .iter()
            .map(|field| field.replace('"', "").trim().to_string())
            .collect()
    }

    /// Turn one CSV record into a measurement, or explain why it was dropped
    pub fn parse_record(
        &self,
        record: &StringRecord,
        line: u64,
    ) -> Result<RawMeasurement, ImportError> {
        if record.len() < MIN_FIELDS {
            return Err(ImportError::TooFewFields {
                line,
                expected: MIN_FIELDS,
                found: record.len(),
            });
        }

        let metric = |index: usize| Self::parse_metric(record.get(index));

        let weight = MeasurementValidator::has_usable_weight(metric(column::WEIGHT))
            .ok_or(ImportError::MissingWeight { line })?;

        let date_field = record.get(column::DATE_TIME).unwrap_or_default();
        let timestamp =
            Self::parse_datetime(date_field).ok_or_else(|| ImportError::InvalidTimestamp {
                line,
                value: date_field.to_string(),
            })?;
        let date_label = date_field
            .split(|c: char| c == ' ' || c == 'T')
            .next()
            .unwrap_or(date_field)
            .to_string();

        let timezone = record
            .get(column::TIMEZONE)
            .filter(|tz| !tz.is_empty())
            .map(str::to_string);

        let mut measurement = RawMeasurement {
            timestamp,
            date_label,
            timezone,
            weight,
            body_fat_percent: metric(column::BODY_FAT_PERCENT),
            body_fat_mass: metric(column::BODY_FAT_MASS),
            visceral_fat: metric(column::VISCERAL_FAT),
            bmr: metric(column::BMR),
            skeletal_muscle_percent: metric(column::SKELETAL_MUSCLE_PERCENT),
            skeletal_muscle_mass: metric(column::SKELETAL_MUSCLE_MASS),
            arm_muscle_pct: metric(column::ARM_MUSCLE_PCT),
            trunk_muscle_pct: metric(column::TRUNK_MUSCLE_PCT),
            leg_muscle_pct: metric(column::LEG_MUSCLE_PCT),
            sub_fat_percent: metric(column::SUB_FAT_PERCENT),
            arm_fat_pct: metric(column::ARM_FAT_PCT),
            trunk_fat_pct: metric(column::TRUNK_FAT_PCT),
            leg_fat_pct: metric(column::LEG_FAT_PCT),
            bmi: metric(column::BMI),
            body_age: metric(column::BODY_AGE),
        };

        MeasurementValidator::backfill_masses(&mut measurement);

        Ok(measurement)
    }
}

impl ImportFormat for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
    }

    fn import_str(&self, content: &str) -> Vec<RawMeasurement> {
        let content = content.trim_start_matches('\u{feff}').trim();

        // Quote handling is off: a stray quote must never join two lines
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(content.as_bytes());

        let mut measurements = Vec::new();
        let mut dropped = 0usize;

        for (index, result) in reader.records().enumerate() {
            let fallback_line = index as u64 + 2;

            let parsed = result
                .map_err(|e| ImportError::MalformedRecord {
                    line: e.position().map(|p| p.line()).unwrap_or(fallback_line),
                    reason: e.to_string(),
                })
                .and_then(|record| {
                    let line = record
                        .position()
                        .map(|p| p.line())
                        .unwrap_or(fallback_line);
                    self.parse_record(&Self::strip_quotes(&record), line)
                });

            match parsed {
                Ok(measurement) => measurements.push(measurement),
                Err(e) => {
                    dropped += 1;
                    debug!(error = %e, "Dropped export row");
                }
            }
        }

        MeasurementValidator::sort_series(&mut measurements);

        info!(
            imported = measurements.len(),
            dropped,
            format = self.get_format_name(),
            "Parsed measurement export"
        );

        measurements
    }

    fn get_format_name(&self) -> &'static str {
        "CSV"
    }
}
