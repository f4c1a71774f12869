//! Terminal rendering of reports and segmental tables

use colored::*;
use std::io::Write;
use tabled::{settings::Style, Table, Tabled};

use crate::classification::{ReferenceStatus, PLACEHOLDER};
use crate::error::ExportError;
use crate::reference::{BarStatus, StandardBar};
use crate::report::CompositionReport;
use crate::segmental::{Segment, SegmentalBreakdown};

/// Segment display row for tables
#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "Segment")]
    segment: String,
    #[tabled(rename = "Muscle %")]
    muscle_pct: String,
    #[tabled(rename = "Muscle (kg)")]
    muscle_mass: String,
    #[tabled(rename = "Fat %")]
    fat_pct: String,
    #[tabled(rename = "Fat (kg)")]
    fat_mass: String,
}

/// Muscle-fat analysis row
#[derive(Tabled)]
struct StandardRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value (kg)")]
    value: String,
    #[tabled(rename = "% of standard")]
    percent: String,
    #[tabled(rename = "Normal range (kg)")]
    normal_range: String,
    #[tabled(rename = "Scale")]
    gauge: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Width of the percent-of-standard gauge, in characters
const GAUGE_WIDTH: usize = 20;

/// Format an optional number, falling back to the placeholder
pub fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{:.*}", precision, v))
}

fn fmt_delta(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v > 0.0 => format!("+{:.*}", precision, v),
        Some(v) => format!("{:.*}", precision, v),
        None => PLACEHOLDER.to_string(),
    }
}

fn label_or_placeholder<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

fn status_colored(status: ReferenceStatus) -> ColoredString {
    match status {
        ReferenceStatus::Normal => status.label().green(),
        ReferenceStatus::Low | ReferenceStatus::Elevated => status.label().yellow(),
        ReferenceStatus::Unavailable => status.label().dimmed(),
    }
}

fn bar_status(status: Option<BarStatus>) -> String {
    match status {
        Some(BarStatus::Under) => "under".yellow().to_string(),
        Some(BarStatus::Normal) => "normal".green().to_string(),
        Some(BarStatus::Over) => "over".red().to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Marker on a fixed-width track, placed by the bar's display scale
fn gauge(bar: &StandardBar) -> String {
    let Some(percent) = bar.percent_of_standard else {
        return PLACEHOLDER.to_string();
    };
    let position = bar.scale.position(percent);
    let marker = ((position / 100.0) * (GAUGE_WIDTH - 1) as f64).round() as usize;

    (0..GAUGE_WIDTH)
        .map(|i| if i == marker { '|' } else { '-' })
        .collect()
}

fn standard_row(metric: &'static str, bar: &StandardBar) -> StandardRow {
    StandardRow {
        metric,
        value: fmt_opt(bar.value, 1),
        percent: fmt_opt(bar.percent_of_standard, 0),
        normal_range: format!("{:.1} - {:.1}", bar.normal_range.0, bar.normal_range.1),
        gauge: gauge(bar),
        status: bar_status(bar.status),
    }
}

/// Segment table in the given display order, closed by the attributed totals
pub fn render_segments(breakdown: &SegmentalBreakdown, order: &[Segment]) -> String {
    let mut rows: Vec<SegmentRow> = breakdown
        .in_order(order)
        .into_iter()
        .map(|estimate| SegmentRow {
            segment: estimate.segment.label().to_string(),
            muscle_pct: fmt_opt(estimate.muscle_pct, 1),
            muscle_mass: fmt_opt(estimate.muscle_mass, 2),
            fat_pct: fmt_opt(estimate.fat_pct, 1),
            fat_mass: fmt_opt(estimate.fat_mass, 2),
        })
        .collect();

    // Head and neck are not attributed to any segment
    rows.push(SegmentRow {
        segment: "Limbs + trunk".to_string(),
        muscle_pct: String::new(),
        muscle_mass: fmt_opt(breakdown.total_muscle_mass(), 2),
        fat_pct: String::new(),
        fat_mass: fmt_opt(breakdown.total_fat_mass(), 2),
    });

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Human-readable report for terminals
pub fn write_report_text<W: Write>(
    report: &CompositionReport,
    out: &mut W,
) -> Result<(), ExportError> {
    writeln!(out, "{}", "BODY COMPOSITION REPORT".bold())?;
    writeln!(
        out,
        "Range: {}  |  Records: {} of {}  |  Gender: {}  |  Height: {}",
        report.range,
        report.record_count,
        report.total_records,
        report.profile.gender,
        report
            .profile
            .height_cm
            .map_or_else(|| "device estimate".to_string(), |h| format!("{:.1} cm", h)),
    )?;
    writeln!(out, "Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;

    let (Some(latest), Some(labels)) = (&report.latest, &report.labels) else {
        writeln!(out, "{}", "No measurements in the selected range".yellow())?;
        return Ok(());
    };
    let raw = &latest.raw;

    writeln!(out, "{}", format!("LATEST SCAN  {}", raw.date_label).cyan().bold())?;
    writeln!(out, "Weight:             {:.2} kg", raw.weight)?;
    writeln!(
        out,
        "Body fat:           {} % ({} kg)  [{}]",
        fmt_opt(raw.body_fat_percent, 1),
        fmt_opt(raw.body_fat_mass, 2),
        status_colored(labels.body_fat_status)
    )?;
    writeln!(
        out,
        "Skeletal muscle:    {} % ({} kg)  [{}]",
        fmt_opt(raw.skeletal_muscle_percent, 1),
        fmt_opt(raw.skeletal_muscle_mass, 2),
        status_colored(labels.skeletal_muscle_status)
    )?;
    writeln!(out, "Fat-free mass:      {} kg", fmt_opt(latest.fat_free_mass, 2))?;
    writeln!(out, "Soft lean mass:     {} kg", fmt_opt(latest.soft_lean_mass, 2))?;
    writeln!(out, "Bone:               {} kg", fmt_opt(latest.bone_mass, 2))?;
    writeln!(out, "Protein:            {} kg", fmt_opt(latest.protein, 2))?;
    writeln!(
        out,
        "Body water:         {} kg (ICW {} / ECW {})  [{}]",
        fmt_opt(latest.total_body_water, 2),
        fmt_opt(latest.intracellular_water, 2),
        fmt_opt(latest.extracellular_water, 2),
        label_or_placeholder(labels.water_balance)
    )?;
    writeln!(
        out,
        "FFMI:               {}  [{}]",
        fmt_opt(latest.ffmi, 2),
        label_or_placeholder(labels.ffmi)
    )?;
    writeln!(
        out,
        "BMI:                {}  [{}]",
        fmt_opt(raw.bmi, 1),
        label_or_placeholder(labels.bmi_category)
    )?;
    writeln!(
        out,
        "Visceral fat:       {}  [{}]",
        fmt_opt(raw.visceral_fat, 1),
        status_colored(labels.visceral_fat_status)
    )?;
    writeln!(out, "BMR:                {} kcal", fmt_opt(raw.bmr, 0))?;
    writeln!(out, "Body age:           {}", fmt_opt(raw.body_age, 0))?;
    writeln!(out)?;

    if let Some(changes) = &report.changes {
        writeln!(out, "{}", "CHANGE SINCE START".cyan().bold())?;
        writeln!(out, "Weight:       {} kg", fmt_delta(Some(changes.weight), 2))?;
        writeln!(out, "Body fat:     {} %", fmt_delta(changes.body_fat_percent, 1))?;
        writeln!(out, "Muscle:       {} %", fmt_delta(changes.skeletal_muscle_percent, 1))?;
        writeln!(out, "FFMI:         {}", fmt_delta(changes.ffmi, 2))?;
        writeln!(out, "BMI:          {}", fmt_delta(changes.bmi, 1))?;
        writeln!(out, "Visceral fat: {}", fmt_delta(changes.visceral_fat, 1))?;
        writeln!(out)?;
    }

    if let Some(analysis) = &report.muscle_fat {
        writeln!(
            out,
            "{}",
            format!(
                "MUSCLE-FAT ANALYSIS  (standard weight {:.1} kg at {:.1} cm)",
                analysis.standard_weight, analysis.reference_height_cm
            )
            .cyan()
            .bold()
        )?;
        let rows = vec![
            standard_row("Weight", &analysis.weight),
            standard_row("Skeletal muscle", &analysis.skeletal_muscle),
            standard_row("Body fat", &analysis.body_fat),
        ];
        writeln!(out, "{}", Table::new(rows).with(Style::rounded()))?;
        writeln!(out)?;
    }

    if let Some(breakdown) = &report.segmental {
        writeln!(out, "{}", "SEGMENTAL ANALYSIS".cyan().bold())?;
        writeln!(out, "{}", render_segments(breakdown, &Segment::GRID_ORDER))?;
        writeln!(out)?;
    }

    if let Some(assessment) = &report.assessment {
        writeln!(out, "{}", "ASSESSMENT".cyan().bold())?;
        writeln!(
            out,
            "• BMI {} ({}), body type: {}",
            fmt_opt(assessment.bmi, 1),
            label_or_placeholder(assessment.bmi_category),
            label_or_placeholder(assessment.body_type)
        )?;
        writeln!(out, "• Weight change over the range: {} kg", fmt_delta(Some(assessment.weight_change), 1))?;
        writeln!(
            out,
            "• Skeletal muscle {} %, stronger region: {}",
            fmt_opt(assessment.skeletal_muscle_percent, 1),
            label_or_placeholder(assessment.dominant_region)
        )?;
        writeln!(
            out,
            "• BMR {} kcal, body age {} ({})",
            fmt_opt(assessment.bmr, 0),
            fmt_opt(assessment.body_age, 0),
            label_or_placeholder(assessment.body_age_trend)
        )?;
        writeln!(
            out,
            "• Visceral fat level {}: {}",
            fmt_opt(assessment.visceral_fat, 1),
            label_or_placeholder(assessment.visceral_risk)
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_view;
    use crate::import::demo_series;
    use crate::models::UserProfile;
    use crate::range::TimeRange;
    use crate::reference::BarScale;
    use crate::segmental::SegmentalEstimator;

    fn render(report: &CompositionReport) -> String {
        let mut buffer = Vec::new();
        write_report_text(report, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(None, 2), "-");
        assert_eq!(fmt_opt(Some(25.8449), 2), "25.84");
        assert_eq!(fmt_opt(Some(2063.0), 0), "2063");
        assert_eq!(fmt_delta(Some(1.26), 1), "+1.3");
        assert_eq!(fmt_delta(Some(-18.3), 1), "-18.3");
    }

    #[test]
    fn test_render_demo_report() {
        let view = compute_view(&demo_series(), &UserProfile::default(), TimeRange::All);
        let report = CompositionReport::generate(&view);
        let text = render(&report);

        assert!(text.contains("BODY COMPOSITION REPORT"));
        assert!(text.contains("2025/11/25"));
        assert!(text.contains("moderate obesity"));
        assert!(text.contains("Right leg"));
        assert!(text.contains("very high risk"));
        assert!(text.contains("improving"));
    }

    #[test]
    fn test_render_empty_report() {
        let view = compute_view(&[], &UserProfile::default(), TimeRange::All);
        let text = render(&CompositionReport::generate(&view));
        assert!(text.contains("No measurements in the selected range"));
        assert!(!text.contains("ASSESSMENT"));
    }

    #[test]
    fn test_segments_follow_requested_order() {
        let breakdown = SegmentalEstimator::estimate(&demo_series()[2]);
        let table = render_segments(&breakdown, &Segment::GRID_ORDER);

        let left_leg = table.find(Segment::LeftLeg.label()).unwrap();
        let trunk = table.find(Segment::Trunk.label()).unwrap();
        let right_leg = table.find(Segment::RightLeg.label()).unwrap();
        assert!(left_leg < trunk);
        assert!(trunk < right_leg);
    }

    #[test]
    fn test_segment_table_closes_with_totals() {
        let breakdown = SegmentalEstimator::estimate(&demo_series()[2]);
        let table = render_segments(&breakdown, &Segment::GRID_ORDER);

        let totals = table.find("Limbs + trunk").unwrap();
        assert!(table.find(Segment::RightLeg.label()).unwrap() < totals);
        assert!(table.contains(&fmt_opt(breakdown.total_muscle_mass(), 2)));
    }

    #[test]
    fn test_gauge_marks_scale_position() {
        // 125 % sits halfway along the 50..200 weight scale
        let bar = StandardBar::new(Some(125.0), 100.0, BarScale::WEIGHT);
        let track = gauge(&bar);
        assert_eq!(track.chars().count(), GAUGE_WIDTH);
        assert_eq!(track.find('|'), Some(10));

        let clamped = gauge(&StandardBar::new(Some(1000.0), 100.0, BarScale::WEIGHT));
        assert!(clamped.ends_with('|'));

        let missing = StandardBar::new(None, 100.0, BarScale::WEIGHT);
        assert_eq!(gauge(&missing), PLACEHOLDER);
    }

    #[test]
    fn test_write_failure_is_reported() {
        struct ClosedPipe;

        impl Write for ClosedPipe {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let view = compute_view(&demo_series(), &UserProfile::default(), TimeRange::All);
        let report = CompositionReport::generate(&view);
        let result = write_report_text(&report, &mut ClosedPipe);
        assert!(matches!(result, Err(ExportError::WriteFailed { .. })));
    }
}
