//! Main application logic and persistent user settings.
//!
//! The plan lives in a remote spreadsheet with one row per scheduled
//! exercise. Every command re-reads the whole table, works on the in-memory
//! copy and, for `log`, writes the whole table back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;

use chrono::NaiveDate;
use dirs_next as dirs;
use log::info;

mod analysis;
use analysis::{exercise_series, logged_exercises, muscle_focus, total_volume};
mod export;
use export::plan_csv_bytes;
mod ingest;
use ingest::load_plan;
mod planner;
use planner::project_plan;
mod store;
use store::{PlanStore, SheetStore, resolve_sheet_url};
mod tracker;
use tracker::{EntryEdit, apply_edits, select_day};

/// One scheduled exercise entry from the plan sheet.
///
/// `date` and the actual-performance fields are `None` when the sheet cell
/// was empty or unreadable. A `None` actual means "not yet performed", which
/// is distinct from a logged zero.
#[derive(Debug, Clone, PartialEq)]
struct PlanRecord {
    date: Option<NaiveDate>,
    exercise: String,
    muscle_group: String,
    sets: Option<u32>,
    /// Kept as text so ranges like "10-12" and "30 sec" survive.
    target_reps: String,
    actual_weight_kg: Option<f32>,
    actual_reps: Option<f32>,
    difficulty: Option<f32>,
    day_label: String,
}

impl PlanRecord {
    /// Recompute the weekday label from `date`.
    ///
    /// The label is derived, never authored; an unset date clears it.
    fn refresh_day_label(&mut self) {
        self.day_label = self
            .date
            .map(|d| d.format("%a").to_string())
            .unwrap_or_default();
    }

    fn is_logged(&self) -> bool {
        self.actual_weight_kg.is_some()
    }
}

/// Untyped sheet row as read from the remote table, columns addressed by the
/// exact header names. Everything is optional text; cleaning happens in
/// [`ingest`].
#[derive(Debug, Clone, Default, Deserialize)]
struct RawPlanRow {
    #[serde(rename = "Date")]
    date: Option<String>,
    /// Ignored on load; the label is always recomputed from `Date`.
    #[serde(rename = "Day")]
    day: Option<String>,
    #[serde(rename = "Exercise")]
    exercise: Option<String>,
    #[serde(rename = "Muscle Group")]
    muscle_group: Option<String>,
    #[serde(rename = "Sets")]
    sets: Option<String>,
    #[serde(rename = "Target Reps")]
    target_reps: Option<String>,
    #[serde(rename = "Actual Weight (kg)")]
    actual_weight_kg: Option<String>,
    #[serde(rename = "Actual Reps")]
    actual_reps: Option<String>,
    #[serde(rename = "Difficulty (1-10)")]
    difficulty: Option<String>,
}

fn default_weeks() -> u32 {
    4
}

/// Persistent configuration: where the plan sheet lives and how many weeks
/// the generator produces when the count is omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Settings {
    sheet_url: Option<String>,
    #[serde(default = "default_weeks")]
    default_weeks: u32,
}

impl Settings {
    const FILE: &'static str = "sheet_workout_companion.json";

    fn path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|p| p.join(Self::FILE))
    }

    fn load() -> Self {
        if let Some(path) = Self::path() {
            if let Ok(data) = std::fs::read_to_string(&path) {
                if let Ok(cfg) = serde_json::from_str(&data) {
                    return cfg;
                }
            }
        }
        Self::default()
    }

    fn save(&self) {
        if let Some(path) = Self::path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(data) = serde_json::to_string_pretty(self) {
                let _ = std::fs::write(path, data);
            }
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sheet_url: None,
            default_weeks: default_weeks(),
        }
    }
}

fn connect(settings: &Settings) -> Result<SheetStore, Box<dyn Error>> {
    let url = resolve_sheet_url(settings.sheet_url.as_deref())
        .ok_or("no sheet URL configured; run `set-url <url>` or set WORKOUT_SHEET_URL")?;
    Ok(SheetStore::new(url))
}

fn load_records(store: &impl PlanStore) -> Result<Vec<PlanRecord>, Box<dyn Error>> {
    let table = store.read_all()?;
    Ok(load_plan(table.as_slice())?)
}

fn parse_cli_date(arg: Option<&String>) -> Result<NaiveDate, Box<dyn Error>> {
    let arg = arg.ok_or("expected a date argument (YYYY-MM-DD)")?;
    NaiveDate::parse_from_str(arg, "%Y-%m-%d")
        .map_err(|_| format!("bad date `{arg}`, expected YYYY-MM-DD").into())
}

/// Parse one `log` edit argument of the form `<row>=<weight>x<reps>@<difficulty>`,
/// e.g. `3=52.5x8@7`.
fn parse_edit_arg(arg: &str) -> Result<(usize, EntryEdit), String> {
    let bad = || format!("bad edit `{arg}`, expected <row>=<weight>x<reps>@<difficulty>");
    let (row, rest) = arg.split_once('=').ok_or_else(bad)?;
    let (weight, rest) = rest.split_once('x').ok_or_else(bad)?;
    let (reps, difficulty) = rest.split_once('@').ok_or_else(bad)?;
    let row = row.trim().parse::<usize>().map_err(|_| bad())?;
    let weight = weight.trim().parse::<f32>().map_err(|_| bad())?;
    let reps = reps.trim().parse::<f32>().map_err(|_| bad())?;
    let difficulty = difficulty.trim().parse::<f32>().map_err(|_| bad())?;
    Ok((
        row,
        EntryEdit {
            weight,
            reps,
            difficulty,
        },
    ))
}

fn cmd_day(settings: &Settings, date: NaiveDate) -> Result<(), Box<dyn Error>> {
    let store = connect(settings)?;
    let records = load_records(&store)?;
    let day = select_day(&records, date);
    if day.is_empty() {
        println!("No workout scheduled for {date} - rest day.");
        return Ok(());
    }
    let focus = muscle_focus(&records, date);
    if focus.is_empty() {
        println!("Plan for {date} ({})", day[0].1.day_label);
    } else {
        println!("Plan for {date} ({}) - focus: {focus}", day[0].1.day_label);
    }
    for (idx, row) in day {
        let goal = format!(
            "{} x {}",
            row.sets.map_or("-".into(), |s| s.to_string()),
            row.target_reps
        );
        if row.is_logged() {
            println!(
                "[{idx}] {}  goal {}  logged {:.1} kg x {} @ RPE {}",
                row.exercise,
                goal,
                row.actual_weight_kg.unwrap_or(0.0),
                row.actual_reps.map_or("-".into(), |r| format!("{r:.0}")),
                row.difficulty.map_or("-".into(), |d| format!("{d:.0}")),
            );
        } else {
            println!("[{idx}] {}  goal {}  not logged", row.exercise, goal);
        }
    }
    Ok(())
}

fn cmd_log(
    settings: &Settings,
    date: NaiveDate,
    edit_args: &[String],
) -> Result<(), Box<dyn Error>> {
    if edit_args.is_empty() {
        return Err("nothing to log; pass at least one <row>=<weight>x<reps>@<difficulty>".into());
    }
    let store = connect(settings)?;
    let mut records = load_records(&store)?;

    let mut edits: BTreeMap<usize, EntryEdit> = BTreeMap::new();
    for arg in edit_args {
        let (row, edit) = parse_edit_arg(arg)?;
        edits.insert(row, edit);
    }

    // Edits are only accepted for rows scheduled on the chosen day; anything
    // else is a stale or mistyped row number.
    let day_rows: Vec<usize> = select_day(&records, date)
        .into_iter()
        .map(|(i, _)| i)
        .collect();
    for row in edits.keys() {
        if !day_rows.contains(row) {
            return Err(format!("row {row} is not scheduled on {date}").into());
        }
    }

    apply_edits(&mut records, &edits)?;
    store.write_all(&records)?;
    info!("Logged {} entries for {date}", edits.len());
    println!("Saved {} entries for {date}.", edits.len());
    Ok(())
}

fn cmd_stats(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let store = connect(settings)?;
    let records = load_records(&store)?;
    let exercises = logged_exercises(&records);
    if exercises.is_empty() {
        println!("No data logged yet.");
        return Ok(());
    }
    println!("Lifetime volume: {:.0} kg", total_volume(&records));
    println!("Logged exercises: {}", exercises.join(", "));
    Ok(())
}

fn cmd_series(settings: &Settings, exercise: &str) -> Result<(), Box<dyn Error>> {
    let store = connect(settings)?;
    let records = load_records(&store)?;
    let series = exercise_series(&records, exercise);
    if series.is_empty() {
        println!("No logged entries for {exercise}.");
        return Ok(());
    }
    for p in series {
        println!(
            "{}  {:.1} kg x {}  RPE {}",
            p.date,
            p.weight,
            p.reps.map_or("-".into(), |r| format!("{r:.0}")),
            p.difficulty.map_or("-".into(), |d| format!("{d:.0}")),
        );
    }
    Ok(())
}

fn cmd_generate(settings: &Settings, args: &[String]) -> Result<(), Box<dyn Error>> {
    let template_start = parse_cli_date(args.first())?;
    let new_start = parse_cli_date(args.get(1))?;
    let weeks = match args.get(2) {
        Some(w) => w
            .parse::<u32>()
            .map_err(|_| format!("bad week count `{w}`"))?,
        None => settings.default_weeks,
    };
    let out = args.get(3).map(String::as_str).unwrap_or("new_plan.csv");

    let store = connect(settings)?;
    let records = load_records(&store)?;
    let plan = project_plan(&records, template_start, new_start, weeks)?;
    let bytes = plan_csv_bytes(&plan)?;
    std::fs::write(out, &bytes)?;
    info!("Generated {} rows into {out}", plan.len());
    println!("Wrote {} rows ({weeks} weeks) to {out}.", plan.len());
    Ok(())
}

fn print_usage() {
    println!("Sheet Workout Companion");
    println!("  day <date>                      show the plan for a day");
    println!("  log <date> <row>=<w>x<r>@<d>..  record actuals and save to the sheet");
    println!("  stats                           lifetime volume and logged exercises");
    println!("  series <exercise>               weight/reps/RPE history for one exercise");
    println!("  generate <template-start> <new-start> [weeks] [out.csv]");
    println!("  set-url <url>                   remember the sheet endpoint");
    println!("Dates are YYYY-MM-DD. Row numbers come from `day` output.");
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut settings = Settings::load();
    match args.first().map(String::as_str) {
        Some("day") => cmd_day(&settings, parse_cli_date(args.get(1))?),
        Some("log") => cmd_log(&settings, parse_cli_date(args.get(1))?, &args[2..]),
        Some("stats") => cmd_stats(&settings),
        Some("series") => {
            let exercise = args.get(1).ok_or("expected an exercise name")?;
            cmd_series(&settings, exercise)
        }
        Some("generate") => cmd_generate(&settings, &args[1..]),
        Some("set-url") => {
            let url = args.get(1).ok_or("expected a sheet URL")?;
            settings.sheet_url = Some(url.clone());
            settings.save();
            println!("Sheet URL saved.");
            Ok(())
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
