use crate::classification::PLACEHOLDER;
use crate::engine::{AnalyzedMeasurement, DerivedView};
use crate::error::ExportError;
use std::fmt::Display;
use std::io::Write;

/// Column header of a series export
pub const SERIES_HEADER: [&str; 27] = [
    "Date",
    "Time",
    "Timezone",
    "Weight_KG",
    "Body_Fat_Pct",
    "Body_Fat_KG",
    "Fat_Free_KG",
    "Soft_Lean_KG",
    "Bone_KG",
    "Total_Water_KG",
    "Intracellular_Water_KG",
    "Extracellular_Water_KG",
    "Protein_KG",
    "Skeletal_Muscle_Pct",
    "Skeletal_Muscle_KG",
    "Visceral_Fat",
    "BMR_KCAL",
    "BMI",
    "Body_Age",
    "FFMI",
    "FFMI_Band",
    "FFMI_Score",
    "BMI_Category",
    "Water_Balance",
    "Body_Fat_Status",
    "Body_Type",
    "Visceral_Risk",
];

/// Write the filtered series to CSV; missing values become empty cells
pub fn write_series<W: Write>(view: &DerivedView, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SERIES_HEADER)?;

    for record in &view.records {
        wtr.write_record(series_row(record))?;
    }

    wtr.flush()?;
    Ok(())
}

fn series_row(record: &AnalyzedMeasurement) -> Vec<String> {
    let m = &record.measurement;
    let raw = &m.raw;
    let labels = &record.classification;

    vec![
        raw.date_label.clone(),
        raw.timestamp.format("%H:%M").to_string(),
        raw.timezone.clone().unwrap_or_default(),
        raw.weight.to_string(),
        cell(raw.body_fat_percent),
        cell(raw.body_fat_mass),
        cell(m.fat_free_mass),
        cell(m.soft_lean_mass),
        cell(m.bone_mass),
        cell(m.total_body_water),
        cell(m.intracellular_water),
        cell(m.extracellular_water),
        cell(m.protein),
        cell(raw.skeletal_muscle_percent),
        cell(raw.skeletal_muscle_mass),
        cell(raw.visceral_fat),
        cell(raw.bmr),
        cell(raw.bmi),
        cell(raw.body_age),
        cell(m.ffmi),
        cell(labels.ffmi),
        cell(labels.ffmi_score),
        cell(labels.bmi_category),
        cell(labels.water_balance),
        placeholder_as_blank(labels.body_fat_status.label()),
        cell(labels.body_type),
        cell(labels.visceral_risk),
    ]
}

fn cell<T: Display>(value: Option<T>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

fn placeholder_as_blank(label: &str) -> String {
    if label == PLACEHOLDER {
        String::new()
    } else {
        label.to_string()
    }
}
