use serde::Serialize;
use std::io::Write;

use crate::PlanRecord;

/// Column order of the plan table, matching what the ingest side expects.
pub const SHEET_HEADERS: [&str; 9] = [
    "Date",
    "Day",
    "Exercise",
    "Muscle Group",
    "Sets",
    "Target Reps",
    "Actual Weight (kg)",
    "Actual Reps",
    "Difficulty (1-10)",
];

#[derive(Serialize)]
struct SheetRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Day")]
    day: &'a str,
    #[serde(rename = "Exercise")]
    exercise: &'a str,
    #[serde(rename = "Muscle Group")]
    muscle_group: &'a str,
    #[serde(rename = "Sets")]
    sets: Option<u32>,
    #[serde(rename = "Target Reps")]
    target_reps: &'a str,
    #[serde(rename = "Actual Weight (kg)")]
    actual_weight_kg: Option<f32>,
    #[serde(rename = "Actual Reps")]
    actual_reps: Option<f32>,
    #[serde(rename = "Difficulty (1-10)")]
    difficulty: Option<f32>,
}

impl<'a> From<&'a PlanRecord> for SheetRow<'a> {
    fn from(r: &'a PlanRecord) -> Self {
        SheetRow {
            date: r
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            day: &r.day_label,
            exercise: &r.exercise,
            muscle_group: &r.muscle_group,
            sets: r.sets,
            target_reps: &r.target_reps,
            actual_weight_kg: r.actual_weight_kg,
            actual_reps: r.actual_reps,
            difficulty: r.difficulty,
        }
    }
}

pub fn write_plan_csv<W: Write>(writer: W, records: &[PlanRecord]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        // serialize() emits the header with the first row; an empty table
        // still needs one.
        wtr.write_record(SHEET_HEADERS)?;
    }
    for r in records {
        wtr.serialize(SheetRow::from(r))?;
    }
    wtr.flush().map_err(Into::into)
}

/// Serialize the record set as a CSV table and return the bytes; the caller
/// decides where they go.
pub fn plan_csv_bytes(records: &[PlanRecord]) -> csv::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_plan_csv(&mut buf, records)?;
    Ok(buf)
}
