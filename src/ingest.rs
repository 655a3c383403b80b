// Module for cleaning raw sheet rows into typed plan records
use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime};

use crate::{PlanRecord, RawPlanRow};

pub const COL_DATE: &str = "Date";
pub const COL_EXERCISE: &str = "Exercise";

/// Fatal load failure: the table is structurally unusable.
///
/// Individual bad cells never end up here; they are nulled in place during
/// cleaning.
#[derive(Debug)]
pub enum IngestionError {
    /// A required column is missing from the header row entirely.
    MissingColumn(&'static str),
    /// The table could not be read as CSV at all.
    Csv(csv::Error),
}

impl std::fmt::Display for IngestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionError::MissingColumn(col) => {
                write!(f, "required column `{col}` is missing from the sheet")
            }
            IngestionError::Csv(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IngestionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestionError::MissingColumn(_) => None,
            IngestionError::Csv(e) => Some(e),
        }
    }
}

impl From<csv::Error> for IngestionError {
    fn from(e: csv::Error) -> Self {
        IngestionError::Csv(e)
    }
}

/// Parse a date cell leniently, returning `None` on anything unreadable.
///
/// The sheet is written in ISO form by this tool, but hand-edited cells show
/// up in a few other shapes.
pub fn parse_date_lenient(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(cell, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cell, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a numeric cell, returning `None` for anything that is not a finite
/// number.
pub fn parse_number(cell: &str) -> Option<f32> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Target reps stay textual so "10-12" and "30 sec" survive; spreadsheet
/// exports sometimes materialize empty cells as the literal text "nan".
fn normalize_target_reps(cell: Option<&str>) -> String {
    match cell {
        Some(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("nan") {
                String::new()
            } else {
                s.to_string()
            }
        }
        None => String::new(),
    }
}

fn clean_text(cell: Option<String>) -> String {
    cell.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn clean_row(raw: RawPlanRow) -> PlanRecord {
    let mut record = PlanRecord {
        date: raw.date.as_deref().and_then(parse_date_lenient),
        exercise: clean_text(raw.exercise),
        muscle_group: clean_text(raw.muscle_group),
        sets: raw
            .sets
            .as_deref()
            .and_then(parse_number)
            .filter(|v| *v >= 0.0)
            .map(|v| v.round() as u32),
        target_reps: normalize_target_reps(raw.target_reps.as_deref()),
        actual_weight_kg: raw
            .actual_weight_kg
            .as_deref()
            .and_then(parse_number)
            .map(|v| v.max(0.0)),
        actual_reps: raw
            .actual_reps
            .as_deref()
            .and_then(parse_number)
            .map(|v| v.max(0.0)),
        difficulty: raw
            .difficulty
            .as_deref()
            .and_then(parse_number)
            .map(|v| v.clamp(0.0, 10.0)),
        day_label: String::new(),
    };
    // Whatever the Day cell said, the label comes from the parsed date.
    record.refresh_day_label();
    if let Some(day_cell) = raw.day.as_deref() {
        let day_cell = day_cell.trim();
        if !day_cell.is_empty() && day_cell != record.day_label {
            log::debug!(
                "Day cell `{day_cell}` disagrees with date-derived label `{}`",
                record.day_label
            );
        }
    }
    record
}

/// Read the raw plan table and clean it into typed records.
///
/// The position of each record in the returned vector is its identity for the
/// rest of the session; rows are never dropped or reordered, so writing the
/// set back reproduces the table shape. Only a missing `Date` or `Exercise`
/// column aborts the load.
pub fn load_plan<R: Read>(reader: R) -> Result<Vec<PlanRecord>, IngestionError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    for required in [COL_DATE, COL_EXERCISE] {
        if !headers.iter().any(|h| h.trim() == required) {
            return Err(IngestionError::MissingColumn(required));
        }
    }

    let mut records = Vec::new();
    for row in rdr.deserialize::<RawPlanRow>() {
        records.push(clean_row(row?));
    }
    log::info!("Loaded {} plan rows", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HEADER: &str = "Date,Day,Exercise,Muscle Group,Sets,Target Reps,Actual Weight (kg),Actual Reps,Difficulty (1-10)";

    fn load(csv: &str) -> Vec<PlanRecord> {
        load_plan(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_clean_full_row() {
        let data = format!("{FULL_HEADER}\n2024-01-01,Mon,Bench Press,Chest,3,10-12,52.5,8,7\n");
        let records = load(&data);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(r.exercise, "Bench Press");
        assert_eq!(r.muscle_group, "Chest");
        assert_eq!(r.sets, Some(3));
        assert_eq!(r.target_reps, "10-12");
        assert_eq!(r.actual_weight_kg, Some(52.5));
        assert_eq!(r.actual_reps, Some(8.0));
        assert_eq!(r.difficulty, Some(7.0));
        assert_eq!(r.day_label, "Mon");
    }

    #[test]
    fn non_numeric_cells_become_null() {
        let data = format!("{FULL_HEADER}\n2024-01-01,Mon,Squat,Legs,three,8,heavy,a few,hard\n");
        let r = &load(&data)[0];
        assert_eq!(r.sets, None);
        assert_eq!(r.actual_weight_kg, None);
        assert_eq!(r.actual_reps, None);
        assert_eq!(r.difficulty, None);
        // The textual target is untouched by numeric coercion.
        assert_eq!(r.target_reps, "8");
    }

    #[test]
    fn nan_target_reps_renders_empty() {
        let data = format!("{FULL_HEADER}\n2024-01-01,Mon,Squat,Legs,3,nan,,,\n2024-01-01,Mon,Plank,Core,3,NaN,,,\n");
        let records = load(&data);
        assert_eq!(records[0].target_reps, "");
        assert_eq!(records[1].target_reps, "");
    }

    #[test]
    fn unparseable_date_becomes_null_with_empty_label() {
        let data = format!("{FULL_HEADER}\nsoon,Mon,Squat,Legs,3,8,,,\n");
        let r = &load(&data)[0];
        assert_eq!(r.date, None);
        assert_eq!(r.day_label, "");
    }

    #[test]
    fn day_label_recomputed_from_date_not_day_cell() {
        // The Day cell lies; the parsed date wins.
        let data = format!("{FULL_HEADER}\n2024-01-01,Fri,Squat,Legs,3,8,,,\n");
        assert_eq!(load(&data)[0].day_label, "Mon");
    }

    #[test]
    fn lenient_date_formats() {
        assert_eq!(
            parse_date_lenient("2024-02-05"),
            NaiveDate::from_ymd_opt(2024, 2, 5)
        );
        assert_eq!(
            parse_date_lenient("02/05/2024"),
            NaiveDate::from_ymd_opt(2024, 2, 5)
        );
        assert_eq!(
            parse_date_lenient("5 Feb 2024"),
            NaiveDate::from_ymd_opt(2024, 2, 5)
        );
        assert_eq!(
            parse_date_lenient("2024-02-05 06:30:00"),
            NaiveDate::from_ymd_opt(2024, 2, 5)
        );
        assert_eq!(parse_date_lenient("not-a-date"), None);
        assert_eq!(parse_date_lenient(""), None);
    }

    #[test]
    fn difficulty_clamped_into_range() {
        let data = format!("{FULL_HEADER}\n2024-01-01,Mon,Squat,Legs,3,8,100,10,15\n2024-01-02,Tue,Bench,Chest,3,8,80,10,-2\n");
        let records = load(&data);
        assert_eq!(records[0].difficulty, Some(10.0));
        assert_eq!(records[1].difficulty, Some(0.0));
    }

    #[test]
    fn negative_weight_and_reps_floor_to_zero() {
        let data = format!("{FULL_HEADER}\n2024-01-01,Mon,Squat,Legs,3,8,-10,-5,5\n");
        let r = &load(&data)[0];
        assert_eq!(r.actual_weight_kg, Some(0.0));
        assert_eq!(r.actual_reps, Some(0.0));
    }

    #[test]
    fn missing_optional_columns_tolerated() {
        let data = "Date,Exercise\n2024-01-01,Squat\n";
        let records = load(data);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.exercise, "Squat");
        assert_eq!(r.muscle_group, "");
        assert_eq!(r.sets, None);
        assert_eq!(r.target_reps, "");
        assert_eq!(r.actual_weight_kg, None);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let err = load_plan("Day,Exercise\nMon,Squat\n".as_bytes()).unwrap_err();
        match err {
            IngestionError::MissingColumn(col) => assert_eq!(col, COL_DATE),
            e => panic!("unexpected error: {e:?}"),
        }

        let err = load_plan("Date,Day\n2024-01-01,Mon\n".as_bytes()).unwrap_err();
        match err {
            IngestionError::MissingColumn(col) => assert_eq!(col, COL_EXERCISE),
            e => panic!("unexpected error: {e:?}"),
        }
    }

    #[test]
    fn blank_rows_keep_their_position() {
        let data = format!("{FULL_HEADER}\n2024-01-01,Mon,Squat,Legs,3,8,,,\n,,,,,,,,\n2024-01-02,Tue,Bench,Chest,3,8,,,\n");
        let records = load(&data);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].exercise, "");
        assert_eq!(records[1].date, None);
        assert_eq!(records[2].exercise, "Bench");
    }

    #[test]
    fn sets_rounded_to_whole_number() {
        let data = format!("{FULL_HEADER}\n2024-01-01,Mon,Squat,Legs,3.0,8,,,\n");
        assert_eq!(load(&data)[0].sets, Some(3));
    }
}
