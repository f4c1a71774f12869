use crate::error::{ImportError, Result};
use crate::models::RawMeasurement;
use std::path::Path;
use tracing::info;

pub mod csv;
pub mod validation;

pub use self::csv::CsvImporter;

/// Canonical three-scan export bundled for demos and tests
pub const DEMO_CSV: &str = include_str!("../../data/demo.csv");

/// Trait for importing scale exports from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Parse an in-memory export into measurements sorted by timestamp.
    ///
    /// Malformed rows are dropped; an empty result is a valid outcome.
    fn import_str(&self, content: &str) -> Vec<RawMeasurement>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;

    /// Read the whole file, then parse it. Only the read can fail.
    fn import_file(&self, file_path: &Path) -> Result<Vec<RawMeasurement>> {
        let content =
            std::fs::read_to_string(file_path).map_err(|e| ImportError::Unreadable {
                path: file_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!(
            path = %file_path.display(),
            format = self.get_format_name(),
            bytes = content.len(),
            "Read measurement export"
        );

        Ok(self.import_str(&content))
    }
}

/// Parse the bundled demo export
pub fn demo_series() -> Vec<RawMeasurement> {
    CsvImporter::new().import_str(DEMO_CSV)
}
