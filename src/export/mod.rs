use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::engine::DerivedView;
use crate::error::ExportError;
use crate::report::CompositionReport;

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Write the filtered series of a view. Text is not a series format.
pub fn write_series<W: Write>(
    view: &DerivedView,
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => csv::write_series(view, writer),
        ExportFormat::Json => json::write_json(&view.records, writer),
        ExportFormat::Text => Err(ExportError::UnsupportedFormat(
            "text export is only available for reports".to_string(),
        )),
    }
}

/// Write a full report
pub fn write_report<W: Write>(
    report: &CompositionReport,
    format: ExportFormat,
    mut writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Json => json::write_json(report, writer),
        ExportFormat::Text => {
            text::write_report_text(report, &mut writer)?;
            writer.flush()?;
            Ok(())
        }
        ExportFormat::Csv => Err(ExportError::UnsupportedFormat(
            "csv export is only available for series".to_string(),
        )),
    }
}

/// Export the series of a view to a file
pub fn export_series<P: AsRef<Path>>(
    view: &DerivedView,
    format: ExportFormat,
    output_path: P,
) -> Result<(), ExportError> {
    let path = output_path.as_ref();
    let file = create(path)?;
    write_series(view, format, BufWriter::new(file)).map_err(|e| with_path(e, path))?;

    info!(
        path = %path.display(),
        format = format.extension(),
        records = view.len(),
        "Exported series"
    );
    Ok(())
}

/// Export a report to a file
pub fn export_report<P: AsRef<Path>>(
    report: &CompositionReport,
    format: ExportFormat,
    output_path: P,
) -> Result<(), ExportError> {
    let path = output_path.as_ref();
    let file = create(path)?;
    write_report(report, format, BufWriter::new(file)).map_err(|e| with_path(e, path))?;

    info!(path = %path.display(), format = format.extension(), "Exported report");
    Ok(())
}

fn create(path: &Path) -> Result<File, ExportError> {
    File::create(path).map_err(|e| ExportError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Attach the output path to write failures raised by a writer
fn with_path(err: ExportError, path: &Path) -> ExportError {
    match err {
        ExportError::WriteFailed { reason, .. } => ExportError::WriteFailed {
            path: path.to_path_buf(),
            reason,
        },
        other => other,
    }
}
