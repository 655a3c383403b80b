// Module for projecting a template week into future plan weeks
use chrono::{Duration, NaiveDate};

use crate::PlanRecord;

/// The template window contained no dated rows; no plan was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyTemplateError {
    pub template_start: NaiveDate,
}

impl std::fmt::Display for EmptyTemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no plan rows dated within the template week starting {}",
            self.template_start
        )
    }
}

impl std::error::Error for EmptyTemplateError {}

/// Repeat the template week `weeks` times starting at `new_start`.
///
/// The template is every row dated inside the 7 days beginning at
/// `template_start`, inclusive on both ends. Each copy shifts its date by
/// `new_start - template_start` plus a whole number of weeks, recomputes the
/// weekday label and clears the actual-performance fields; targets are copied
/// verbatim. The shift is signed, so a `new_start` before the template is
/// allowed. The result is a fresh vector in week-major order; the input set
/// is untouched.
pub fn project_plan(
    records: &[PlanRecord],
    template_start: NaiveDate,
    new_start: NaiveDate,
    weeks: u32,
) -> Result<Vec<PlanRecord>, EmptyTemplateError> {
    let template_end = template_start + Duration::days(6);
    let template: Vec<&PlanRecord> = records
        .iter()
        .filter(|r| {
            r.date
                .map_or(false, |d| d >= template_start && d <= template_end)
        })
        .collect();
    if template.is_empty() {
        return Err(EmptyTemplateError { template_start });
    }

    let base_shift = new_start - template_start;
    let mut plan = Vec::with_capacity(template.len() * weeks as usize);
    for week in 0..weeks {
        let shift = base_shift + Duration::days(7 * i64::from(week));
        for row in &template {
            let mut copy = (*row).clone();
            copy.date = copy.date.map(|d| d + shift);
            copy.actual_weight_kg = None;
            copy.actual_reps = None;
            copy.difficulty = None;
            copy.refresh_day_label();
            plan.push(copy);
        }
    }
    log::info!(
        "Projected {} template rows over {} weeks starting {}",
        template.len(),
        weeks,
        new_start
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn rec(date: NaiveDate, exercise: &str) -> PlanRecord {
        let mut r = PlanRecord {
            date: Some(date),
            exercise: exercise.into(),
            muscle_group: "Legs".into(),
            sets: Some(3),
            target_reps: "10-12".into(),
            actual_weight_kg: Some(60.0),
            actual_reps: Some(10.0),
            difficulty: Some(7.0),
            day_label: String::new(),
        };
        r.refresh_day_label();
        r
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn template_plan() -> Vec<PlanRecord> {
        vec![
            rec(d(2024, 1, 1), "Squat"),
            rec(d(2024, 1, 3), "Bench"),
            rec(d(2024, 1, 3), "Dips"),
            rec(d(2024, 1, 7), "Deadlift"),
            // Outside the window, must not be picked up.
            rec(d(2024, 1, 8), "Row"),
        ]
    }

    #[test]
    fn shifts_each_week_by_whole_weeks() {
        let plan = template_plan();
        let out = project_plan(&plan, d(2024, 1, 1), d(2024, 2, 5), 2).unwrap();

        // 4 template rows, 2 weeks.
        assert_eq!(out.len(), 8);

        // new_start - template_start = 35 days; week 1 adds another 7.
        for (i, row) in out.iter().take(4).enumerate() {
            let expected = plan[i].date.unwrap() + Duration::days(35);
            assert_eq!(row.date, Some(expected));
        }
        for (i, row) in out.iter().skip(4).enumerate() {
            let expected = plan[i].date.unwrap() + Duration::days(42);
            assert_eq!(row.date, Some(expected));
        }
    }

    #[test]
    fn window_is_inclusive_and_excludes_day_eight() {
        let plan = template_plan();
        let out = project_plan(&plan, d(2024, 1, 1), d(2024, 2, 5), 1).unwrap();
        let names: Vec<&str> = out.iter().map(|r| r.exercise.as_str()).collect();
        assert_eq!(names, vec!["Squat", "Bench", "Dips", "Deadlift"]);
    }

    #[test]
    fn actuals_reset_and_targets_copied() {
        let plan = template_plan();
        let out = project_plan(&plan, d(2024, 1, 1), d(2024, 2, 5), 3).unwrap();
        for row in &out {
            assert_eq!(row.actual_weight_kg, None);
            assert_eq!(row.actual_reps, None);
            assert_eq!(row.difficulty, None);
        }
        assert_eq!(out[0].sets, Some(3));
        assert_eq!(out[0].target_reps, "10-12");
        assert_eq!(out[0].muscle_group, "Legs");
    }

    #[test]
    fn day_labels_match_shifted_dates() {
        let plan = template_plan();
        let out = project_plan(&plan, d(2024, 1, 1), d(2024, 2, 5), 2).unwrap();
        for row in &out {
            let date = row.date.unwrap();
            assert_eq!(row.day_label, date.format("%a").to_string());
        }
        // 2024-01-01 was a Monday and so is 2024-02-05; weekday alignment is
        // preserved by whole-week shifts.
        assert_eq!(out[0].date.map(|d| d.weekday().to_string()), Some("Mon".into()));
    }

    #[test]
    fn projection_is_deterministic() {
        let plan = template_plan();
        let a = project_plan(&plan, d(2024, 1, 1), d(2024, 2, 5), 2).unwrap();
        let b = project_plan(&plan, d(2024, 1, 1), d(2024, 2, 5), 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn input_set_is_untouched() {
        let plan = template_plan();
        let before = plan.clone();
        let _ = project_plan(&plan, d(2024, 1, 1), d(2024, 2, 5), 2).unwrap();
        assert_eq!(plan, before);
    }

    #[test]
    fn negative_shift_projects_into_the_past() {
        let plan = template_plan();
        let out = project_plan(&plan, d(2024, 1, 1), d(2023, 12, 4), 1).unwrap();
        assert_eq!(out[0].date, Some(d(2023, 12, 4)));
    }

    #[test]
    fn empty_window_is_an_error() {
        let plan = template_plan();
        let err = project_plan(&plan, d(2024, 6, 1), d(2024, 7, 1), 2).unwrap_err();
        assert_eq!(err.template_start, d(2024, 6, 1));
    }

    #[test]
    fn zero_weeks_yields_empty_plan() {
        let plan = template_plan();
        let out = project_plan(&plan, d(2024, 1, 1), d(2024, 2, 5), 0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn undated_rows_never_enter_the_template() {
        let mut plan = template_plan();
        plan.push(PlanRecord {
            date: None,
            exercise: "Mystery".into(),
            muscle_group: String::new(),
            sets: None,
            target_reps: String::new(),
            actual_weight_kg: None,
            actual_reps: None,
            difficulty: None,
            day_label: String::new(),
        });
        let out = project_plan(&plan, d(2024, 1, 1), d(2024, 2, 5), 1).unwrap();
        assert!(out.iter().all(|r| r.exercise != "Mystery"));
    }
}
