use chrono::Local;
use clap::{Parser, Subcommand};
use lift_core::report::MAX_WINDOW_DAYS;
use lift_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lift")]
#[command(about = "Four-workout lifting rotation tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active workout's next set, or the next workout (default)
    Status,

    /// Show the next workout in the rotation with suggested weights
    Next,

    /// Start the next workout in the rotation
    Start,

    /// Log a set for the active workout
    Log {
        /// Weight used; defaults to the suggested weight
        #[arg(long, allow_negative_numbers = true)]
        weight: Option<f64>,

        /// Reps performed
        #[arg(long, allow_negative_numbers = true)]
        reps: i32,

        /// Set duration in seconds
        #[arg(long)]
        duration: Option<u32>,

        /// Exercise id; defaults to the current step
        #[arg(long, requires = "set")]
        exercise: Option<String>,

        /// Set number; defaults to the current step
        #[arg(long, requires = "exercise")]
        set: Option<u32>,
    },

    /// Discard the active workout without advancing the rotation
    Cancel,

    /// Completed workouts from the last two weeks
    Recent,

    /// All-time summary
    Wrapped {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Body-weight tracking
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },

    /// Export history to CSV files
    Export {
        /// Output directory
        #[arg(long)]
        out: PathBuf,
    },

    /// List the workout rotation
    Catalog,
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Record today's body weight
    Log {
        #[arg(allow_negative_numbers = true)]
        weight: f64,
    },
    /// Show today's entry
    Today,
    /// Entries from the last N days
    Recent {
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_WINDOW_DAYS))]
        days: Option<i64>,
    },
    /// Most recent entry
    Latest,
}

fn main() -> Result<()> {
    // Initialize logging
    lift_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let store = JsonFileStore::new(lift_core::config::state_path_in(&data_dir));
    let mut tracker = Tracker::open(store, config)?;

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => cmd_status(&tracker),
        Commands::Next => cmd_next(&tracker),
        Commands::Start => cmd_start(&mut tracker),
        Commands::Log {
            weight,
            reps,
            duration,
            exercise,
            set,
        } => cmd_log(&mut tracker, weight, reps, duration, exercise.zip(set)),
        Commands::Cancel => cmd_cancel(&mut tracker),
        Commands::Recent => cmd_recent(&tracker),
        Commands::Wrapped { json } => cmd_wrapped(&tracker, json),
        Commands::Weight { command } => cmd_weight(&mut tracker, command),
        Commands::Export { out } => cmd_export(&tracker, out),
        Commands::Catalog => cmd_catalog(&tracker),
    }
}

type FileTracker = Tracker<JsonFileStore>;

fn cmd_status(tracker: &FileTracker) -> Result<()> {
    let Some(session) = tracker.active_session() else {
        let next = tracker.next_workout()?;
        println!("No active workout. Next up: {}", next.name);
        println!("  Run `lift start` to begin.");
        return Ok(());
    };

    let workout = tracker.catalog().workout(&session.workout_id)?;
    match tracker.current_exercise_and_set(session.id)? {
        Some(step) => display_step(tracker, &workout.name, &step),
        None => println!("{}: all sets logged", workout.name),
    }
    Ok(())
}

fn cmd_next(tracker: &FileTracker) -> Result<()> {
    let workout = tracker.next_workout()?;
    println!("\nNext workout: {}", workout.name);
    println!("─────────────────────────────────────────");
    for exercise in &workout.exercises {
        println!(
            "  {:<28} {} x {}  @ {} lbs",
            exercise.name,
            exercise.sets,
            rep_range(exercise),
            fmt_weight(tracker.last_weight_for_exercise(&exercise.id))
        );
    }
    println!();
    Ok(())
}

fn cmd_start(tracker: &mut FileTracker) -> Result<()> {
    let session = tracker.start_workout()?;
    let workout = tracker.catalog().workout(&session.workout_id)?;
    println!("✓ Started {}", workout.name);

    if let Some(step) = tracker.current_exercise_and_set(session.id)? {
        display_step(tracker, &workout.name, &step);
    }
    Ok(())
}

fn cmd_log(
    tracker: &mut FileTracker,
    weight: Option<f64>,
    reps: i32,
    duration: Option<u32>,
    target: Option<(String, u32)>,
) -> Result<()> {
    let session_id = tracker
        .active_session()
        .map(|s| s.id)
        .ok_or_else(|| Error::not_found("no active workout; run `lift start` first"))?;

    let (exercise_id, set_number) = match target {
        Some(target) => target,
        None => {
            let step = tracker
                .current_exercise_and_set(session_id)?
                .ok_or_else(|| Error::conflict("every set of this workout is already logged"))?;
            (step.exercise.id.clone(), step.set_number)
        }
    };
    let weight = weight.unwrap_or_else(|| tracker.last_weight_for_exercise(&exercise_id));

    let logged = tracker.log_set(
        session_id,
        SetEntry {
            exercise_id,
            set_number,
            weight,
            reps,
            duration_seconds: duration,
        },
    )?;

    let name = tracker
        .catalog()
        .exercise(&logged.set.exercise_id)
        .map(|e| e.name.as_str())
        .unwrap_or(logged.set.exercise_id.as_str());
    println!(
        "✓ Logged {} set {}: {} lbs x {}",
        name,
        logged.set.set_number,
        fmt_weight(logged.set.weight),
        logged.set.reps
    );

    match logged.completion {
        Some(completion) => {
            println!("\n✓ Workout complete!");
            for change in &completion.progressions {
                println!(
                    "  ↑ {}: {} → {} lbs",
                    change.exercise_id,
                    fmt_weight(change.from),
                    fmt_weight(change.to)
                );
            }
            let next = tracker.catalog().workout(&completion.next_workout_id)?;
            println!("  Next up: {}", next.name);
        }
        None => cmd_status(tracker)?,
    }
    Ok(())
}

fn cmd_cancel(tracker: &mut FileTracker) -> Result<()> {
    match tracker.cancel_workout()? {
        Some(session) => println!(
            "✓ Canceled {} ({} set(s) discarded)",
            session.workout_id,
            session.sets.len()
        ),
        None => println!("No active workout to cancel."),
    }
    Ok(())
}

fn cmd_recent(tracker: &FileTracker) -> Result<()> {
    let sessions = tracker.recent_progress()?;
    if sessions.is_empty() {
        println!("No completed workouts in the last {} days.", tracker.config().reports.recent_window_days);
        return Ok(());
    }

    println!("Completed workouts: {}", tracker.completed_workouts_count());
    for session in sessions {
        let name = tracker
            .catalog()
            .workout(&session.workout_id)
            .map(|w| w.name.as_str())
            .unwrap_or(session.workout_id.as_str());
        println!(
            "  {}  {:<10} {} sets",
            session.started_at.with_timezone(&Local).format("%a %b %e"),
            name,
            session.sets.len()
        );
    }
    Ok(())
}

fn cmd_wrapped(tracker: &FileTracker, json: bool) -> Result<()> {
    let report = tracker.wrapped_data();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WRAPPED");
    println!("╰─────────────────────────────────────────╯");
    println!("  Workouts completed: {}", report.total_workouts);
    println!("  Sets logged:        {}", report.total_sets);
    if let Some(first) = report.first_workout_date {
        println!("  First workout:      {}", first.with_timezone(&Local).format("%Y-%m-%d"));
    }
    if let Some(last) = report.last_workout_date {
        println!("  Last workout:       {}", last.with_timezone(&Local).format("%Y-%m-%d"));
    }

    if !report.exercise_stats.is_empty() {
        println!("\n  Exercise            first → latest (max), sets");
        for (id, stats) in &report.exercise_stats {
            println!(
                "  {:<28} {} → {} ({}), {}",
                id,
                fmt_weight(stats.first_weight),
                fmt_weight(stats.latest_weight),
                fmt_weight(stats.max_weight),
                stats.total_sets
            );
        }
    }

    if let Some(bw) = report.body_weight_stats {
        println!("\n  Body weight: {} → {} ({:+})", fmt_weight(bw.first_weight), fmt_weight(bw.latest_weight), bw.change);
        println!(
            "  Range {} – {} over {} entries",
            fmt_weight(bw.lowest_weight),
            fmt_weight(bw.highest_weight),
            bw.total_entries
        );
    }
    println!();
    Ok(())
}

fn cmd_weight(tracker: &mut FileTracker, command: WeightCommands) -> Result<()> {
    match command {
        WeightCommands::Log { weight } => {
            let entry = tracker.log_body_weight(weight)?;
            println!("✓ Logged body weight: {} lbs", fmt_weight(entry.weight));
        }
        WeightCommands::Today => match tracker.today_weight() {
            Some(entry) => println!("Today: {} lbs", fmt_weight(entry.weight)),
            None => println!("No weight logged today."),
        },
        WeightCommands::Recent { days } => {
            let days = days.unwrap_or(tracker.config().reports.body_weight_days);
            let entries = tracker.recent_body_weights(days)?;
            if entries.is_empty() {
                println!("No entries in the last {} days.", days);
            }
            for entry in entries {
                println!(
                    "  {}  {} lbs",
                    entry.recorded_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    fmt_weight(entry.weight)
                );
            }
        }
        WeightCommands::Latest => match tracker.latest_body_weight() {
            Some(entry) => println!(
                "Latest: {} lbs ({})",
                fmt_weight(entry.weight),
                entry.recorded_at.with_timezone(&Local).format("%Y-%m-%d")
            ),
            None => println!("No body weight logged yet."),
        },
    }
    Ok(())
}

fn cmd_export(tracker: &FileTracker, out: PathBuf) -> Result<()> {
    let summary = tracker.export_csv(&out)?;
    println!(
        "✓ Exported {} sets and {} body-weight entries",
        summary.sets, summary.body_weights
    );
    println!("  Directory: {}", out.display());
    Ok(())
}

fn cmd_catalog(tracker: &FileTracker) -> Result<()> {
    let catalog = tracker.catalog();
    let next = tracker.next_workout()?;
    for id in &catalog.sequence {
        let workout = catalog.workout(id)?;
        let marker = if workout.id == next.id { "→" } else { " " };
        println!("{} {} ({} sets)", marker, workout.name, workout.total_sets());
        for exercise in &workout.exercises {
            println!(
                "      {:<28} {} x {}  [{}]",
                exercise.name,
                exercise.sets,
                rep_range(exercise),
                exercise.id
            );
        }
    }
    Ok(())
}

fn display_step(tracker: &FileTracker, workout_name: &str, step: &Step<'_>) {
    let exercise = step.exercise;
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}  ({}/{} sets)", workout_name, step.completed_sets, step.total_sets);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", exercise.name);
    println!("  Set {} of {}", step.set_number, exercise.sets);
    println!("  Target: {} reps", rep_range(exercise));
    println!(
        "  Suggested: {} lbs",
        fmt_weight(tracker.last_weight_for_exercise(&exercise.id))
    );
    println!();
}

fn rep_range(exercise: &Exercise) -> String {
    let range = if exercise.min_reps == exercise.max_reps {
        exercise.max_reps.to_string()
    } else {
        format!("{}-{}", exercise.min_reps, exercise.max_reps)
    };
    if exercise.per_side {
        format!("{} per side", range)
    } else {
        range
    }
}

fn fmt_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}", weight)
    } else {
        format!("{}", weight)
    }
}
