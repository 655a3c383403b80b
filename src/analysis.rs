// Module for analyzing logged workout data
use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::PlanRecord;

/// One logged data point for an exercise's history.
///
/// `weight` is always present; a record only counts as logged once its
/// actual weight is recorded. Reps and difficulty may still be unset.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub weight: f32,
    pub reps: Option<f32>,
    pub difficulty: Option<f32>,
}

/// Total lifetime volume in kg over logged records.
///
/// Volume is sets x reps x weight per record. Within that product an unset
/// sets or reps counts as 0; rows without a logged weight are excluded
/// entirely.
pub fn total_volume(records: &[PlanRecord]) -> f32 {
    let mut volume = 0.0;
    for r in records {
        if let Some(weight) = r.actual_weight_kg {
            volume += r.sets.unwrap_or(0) as f32 * r.actual_reps.unwrap_or(0.0) * weight;
        }
    }
    volume
}

/// Date-ordered history of one exercise from logged records.
///
/// Matching is exact and case-sensitive. Logged rows without a readable date
/// cannot be placed on a time axis and are skipped. Rows sharing a date keep
/// their sheet order.
pub fn exercise_series(records: &[PlanRecord], exercise: &str) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = records
        .iter()
        .filter(|r| r.exercise == exercise)
        .filter_map(|r| {
            let weight = r.actual_weight_kg?;
            let date = r.date?;
            Some(SeriesPoint {
                date,
                weight,
                reps: r.actual_reps,
                difficulty: r.difficulty,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Sorted unique names of exercises with at least one logged record.
pub fn logged_exercises(records: &[PlanRecord]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for r in records {
        if r.is_logged() && !r.exercise.is_empty() {
            names.insert(r.exercise.clone());
        }
    }
    names.into_iter().collect()
}

/// Deduplicated muscle groups scheduled on `day`, joined for display.
///
/// First-seen order, so the caption reads in sheet order.
pub fn muscle_focus(records: &[PlanRecord], day: NaiveDate) -> String {
    let mut seen: Vec<String> = Vec::new();
    for r in records {
        if r.date == Some(day) {
            let group = r.muscle_group.trim();
            if !group.is_empty() && !seen.iter().any(|s| s == group) {
                seen.push(group.to_string());
            }
        }
    }
    seen.join(", ")
}
