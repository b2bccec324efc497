use clap::{Parser, Subcommand};
use liftlog_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Workout log with next-set prediction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a set in the current session
    Log {
        /// Exercise ID
        exercise: String,
        /// Weight in kg
        kg: f64,
        /// Repetitions
        reps: u32,
        /// Rest taken, in seconds
        #[arg(long)]
        rest: Option<u32>,
        /// How the set felt (easy, normal, hard)
        #[arg(long)]
        difficulty: Option<SetDifficulty>,
        /// Duration of the set, in seconds
        #[arg(long)]
        duration: Option<u32>,
    },

    /// End the current session
    End,

    /// Predict the next set
    Next,

    /// Suggest the next set of a specific exercise
    Suggest {
        /// Exercise ID
        exercise: String,
    },

    /// Show e1RM metrics for an exercise
    E1rm {
        /// Exercise ID
        exercise: String,
    },

    /// Weight for a rep count at a difficulty band (warmup, easy, normal, hard)
    Weight {
        /// Exercise ID
        exercise: String,
        /// Repetitions
        reps: u32,
        /// Difficulty band
        band: DifficultyBand,
    },

    /// Set the default rest for an exercise
    Rest {
        /// Exercise ID
        exercise: String,
        /// Rest in seconds
        seconds: u32,
    },

    /// Export all logged sets to CSV
    Export {
        /// Output file
        path: PathBuf,
    },
}

struct Env {
    data_dir: PathBuf,
    config: Config,
    config_path: PathBuf,
    json: bool,
}

impl Env {
    fn history(&self) -> Result<Vec<HistoryEntry>> {
        read_history(&history_path(&self.data_dir))
    }

    fn rest_times(&self) -> &RestTimes {
        &self.config.rest.overrides
    }
}

fn main() -> Result<()> {
    liftlog_core::logging::init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_config_path);
    let config = if config_path.exists() {
        Config::load_from(&config_path)?
    } else {
        tracing::info!("No config file found at {:?}, using defaults", config_path);
        Config::default()
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());

    let mut env = Env {
        data_dir,
        config,
        config_path,
        json: cli.json,
    };

    match cli.command {
        Commands::Log {
            exercise,
            kg,
            reps,
            rest,
            difficulty,
            duration,
        } => {
            let mut set = SetEntry::new(exercise, chrono::Utc::now().timestamp_millis(), kg, reps);
            set.rest = rest;
            set.difficulty = difficulty;
            set.duration = duration;
            cmd_log(&env, set)
        }
        Commands::End => cmd_end(&env),
        Commands::Next => cmd_next(&env),
        Commands::Suggest { exercise } => cmd_suggest(&env, &exercise),
        Commands::E1rm { exercise } => cmd_e1rm(&env, &exercise),
        Commands::Weight {
            exercise,
            reps,
            band,
        } => cmd_weight(&env, &exercise, reps, band),
        Commands::Rest { exercise, seconds } => cmd_rest(&mut env, &exercise, seconds),
        Commands::Export { path } => cmd_export(&env, &path),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_log(env: &Env, set: SetEntry) -> Result<()> {
    if set.kg < 0.0 || !set.kg.is_finite() {
        return Err(Error::Other(format!("Invalid weight: {}", set.kg)));
    }
    if set.reps == 0 {
        return Err(Error::Other("Reps must be at least 1".into()));
    }

    let mut log = HistoryLog::new(history_path(&env.data_dir));
    let summary = format!("{} {}kg x {}", set.ex_id, set.kg, set.reps);
    log.log_set(set)?;

    if env.json {
        let history = log.read()?;
        return print_json(&predict_next_exercise(&history, env.rest_times()));
    }

    println!("✓ Logged {}", summary);
    Ok(())
}

fn cmd_end(env: &Env) -> Result<()> {
    let mut log = HistoryLog::new(history_path(&env.data_dir));
    let ended = log.end_session(chrono::Utc::now().timestamp_millis())?;

    if ended {
        println!("✓ Session ended");
    } else {
        println!("Nothing logged in the current session.");
    }
    Ok(())
}

fn display_prediction(prediction: Option<&NextExercisePrediction>) {
    match prediction {
        Some(prediction) => {
            println!("  {}", prediction.ex_id);
            println!("  → {}kg x {}", prediction.kg, prediction.reps);
            println!("  → Rest {}s", prediction.rest);
            println!("  ℹ {}", prediction.reason);
        }
        None => println!("No prediction yet - log a set to get started."),
    }
}

fn cmd_next(env: &Env) -> Result<()> {
    let history = env.history()?;
    let prediction = predict_next_exercise(&history, env.rest_times());

    if env.json {
        return print_json(&prediction);
    }

    display_prediction(prediction.as_ref());
    Ok(())
}

fn cmd_suggest(env: &Env, exercise: &str) -> Result<()> {
    let history = env.history()?;
    let prediction = predict_exercise_values(&history, exercise, env.rest_times());
    let metrics = calculate_e1rm_metrics(&history, exercise);
    let band = prediction
        .as_ref()
        .and_then(|p| predict_difficulty(metrics.current, p.kg, p.reps));

    if env.json {
        return print_json(&serde_json::json!({
            "prediction": prediction,
            "difficulty": band,
        }));
    }

    if prediction.is_none() {
        println!("{} has never been logged.", exercise);
        return Ok(());
    }

    display_prediction(prediction.as_ref());
    if let Some(band) = band {
        println!("  → Expected difficulty: {}", band);
    }
    Ok(())
}

fn cmd_e1rm(env: &Env, exercise: &str) -> Result<()> {
    let history = env.history()?;
    let metrics = calculate_e1rm_metrics(&history, exercise);

    if env.json {
        return print_json(&metrics);
    }

    if metrics.current <= 0.0 {
        println!("No completed sessions with reliable sets for {}.", exercise);
        return Ok(());
    }

    println!("  {}", exercise);
    println!("  Current e1RM: {:.1}kg", metrics.current);
    println!("  Peak e1RM:    {:.1}kg", metrics.peak);
    match metrics.trend {
        Some(trend) => println!("  Trend:        {:?}", trend),
        None => println!("  Trend:        not enough sessions"),
    }
    println!();
    for weight in &metrics.suggested_weights {
        println!("  {:<12} {:>2} reps @ {}kg", weight.label, weight.reps, weight.kg);
    }
    Ok(())
}

fn cmd_weight(env: &Env, exercise: &str, reps: u32, band: DifficultyBand) -> Result<()> {
    let history = env.history()?;
    let metrics = calculate_e1rm_metrics(&history, exercise);
    let kg = get_weight_for_difficulty(metrics.current, reps, band);

    if env.json {
        return print_json(&serde_json::json!({ "kg": kg, "reps": reps, "band": band }));
    }

    if kg <= 0.0 {
        println!("No e1RM available for {} yet.", exercise);
    } else {
        println!("  {} x {} ({}): {}kg", exercise, reps, band, kg);
    }
    Ok(())
}

fn cmd_rest(env: &mut Env, exercise: &str, seconds: u32) -> Result<()> {
    env.config.set_rest_override(exercise, seconds)?;
    env.config.save_to(&env.config_path)?;
    println!("✓ Rest for {} set to {}s", exercise, seconds);
    Ok(())
}

fn cmd_export(env: &Env, path: &Path) -> Result<()> {
    let history = env.history()?;
    let count = export_sets_csv(&history, path)?;
    println!("✓ Exported {} sets to {}", count, path.display());
    Ok(())
}
