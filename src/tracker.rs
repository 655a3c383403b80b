// Module for the daily tracker: day selection and actual-performance edits
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::PlanRecord;

/// User-entered actuals for one plan row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryEdit {
    pub weight: f32,
    pub reps: f32,
    pub difficulty: f32,
}

/// An edit referenced a row that is not in the loaded plan. Nothing was
/// written.
#[derive(Debug)]
pub struct IntegrityError {
    pub unknown: Vec<usize>,
}

impl std::fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self.unknown.iter().map(|i| i.to_string()).collect();
        write!(
            f,
            "edits reference rows not present in the loaded plan: {}",
            rows.join(", ")
        )
    }
}

impl std::error::Error for IntegrityError {}

/// Return the rows scheduled on `day`, paired with their position in the
/// loaded set.
///
/// The position is the identity later used to route edits back, so callers
/// must keep the record set they selected from. Order is the sheet order; an
/// empty result is a rest day, not an error.
pub fn select_day(records: &[PlanRecord], day: NaiveDate) -> Vec<(usize, &PlanRecord)> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.date == Some(day))
        .collect()
}

/// Apply user edits to the record set, keyed by row identity.
///
/// All identities are validated before anything is written; one unknown row
/// fails the whole batch with no mutation. On success exactly the three
/// actual-performance fields of each addressed row change. Weight and reps
/// floor at 0, difficulty is clamped into 0..=10.
pub fn apply_edits(
    records: &mut [PlanRecord],
    edits: &BTreeMap<usize, EntryEdit>,
) -> Result<(), IntegrityError> {
    let unknown: Vec<usize> = edits
        .keys()
        .copied()
        .filter(|i| *i >= records.len())
        .collect();
    if !unknown.is_empty() {
        return Err(IntegrityError { unknown });
    }

    for (&row, edit) in edits {
        let record = &mut records[row];
        record.actual_weight_kg = Some(edit.weight.max(0.0));
        record.actual_reps = Some(edit.reps.max(0.0));
        record.difficulty = Some(edit.difficulty.clamp(0.0, 10.0));
    }
    log::info!("Applied {} edits", edits.len());
    Ok(())
}
