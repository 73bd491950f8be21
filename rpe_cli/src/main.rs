use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rpe_core::exertion::exertion_shortfall;
use rpe_core::history::{exercise_history, exercise_names, progress_delta, write_history_csv};
use rpe_core::progression::block_outline;
use rpe_core::rpe_table::clamp_exertion;
use rpe_core::*;
use std::path::{Path, PathBuf};

const BLOCKS_FILE: &str = "blocks.json";
const SESSIONS_FILE: &str = "sessions.json";

#[derive(Parser)]
#[command(name = "rpeplan")]
#[command(about = "RPE-based strength training planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prescribe a load from 1RM, reps and target RPE
    Load {
        #[arg(long)]
        one_rep_max: f64,
        #[arg(long)]
        reps: u32,
        #[arg(long)]
        rpe: f64,
    },

    /// Estimate a 1RM from a performed set
    E1rm {
        #[arg(long)]
        load: f64,
        #[arg(long)]
        reps: u32,
    },

    /// Infer the RPE of a performed set from a known 1RM
    Rpe {
        #[arg(long)]
        load: f64,
        #[arg(long)]
        reps: u32,
        #[arg(long)]
        one_rep_max: f64,
        /// Target RPE to compare against
        #[arg(long)]
        target: Option<f64>,
    },

    /// Show week-by-week targets for a block
    Plan {
        /// Block goal (peaking, maintenance)
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        weeks: Option<u32>,
        /// Week-1 RPE
        #[arg(long)]
        rpe: Option<f64>,
        #[arg(long)]
        sets: Option<u32>,
        #[arg(long)]
        reps: Option<u32>,
        #[arg(long, default_value_t = 0.0)]
        one_rep_max: f64,
    },

    /// Classify a logged session (JSON) against its targets
    Feedback {
        session: PathBuf,
        /// Training block (JSON), needed for the next-week message
        #[arg(long)]
        block: Option<PathBuf>,
        /// This session finished the block's rotation for the week
        #[arg(long)]
        rotation_completed: bool,
    },

    /// Show e1RM progress for an exercise
    Progress {
        /// Exercise name; lists known exercises when omitted
        #[arg(long)]
        exercise: Option<String>,
        /// Sessions file (JSON array), defaults to <data-dir>/sessions.json
        #[arg(long)]
        sessions: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        /// Also write the points to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Search the built-in exercise list
    Search { query: String },

    /// Manage training blocks
    Block {
        #[command(subcommand)]
        action: BlockAction,
    },

    /// Start the next session of the active block
    Start {
        /// Session date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Record one set of the session in progress
    Log {
        /// Exercise number as shown by `start` (1-based)
        #[arg(long)]
        exercise: usize,
        /// Set number (1-based)
        #[arg(long)]
        set: usize,
        #[arg(long)]
        load: Option<f64>,
        #[arg(long)]
        reps: Option<u32>,
        #[arg(long)]
        rpe: Option<f64>,
        /// Mark the set completed
        #[arg(long)]
        done: bool,
    },

    /// Add an exercise to the session in progress
    Add {
        name: String,
        #[arg(long, default_value_t = 0.0)]
        one_rep_max: f64,
        #[arg(long)]
        sets: Option<u32>,
        #[arg(long)]
        reps: Option<u32>,
        #[arg(long)]
        rpe: Option<f64>,
        /// Also add it to the block's session template
        #[arg(long)]
        permanent: bool,
    },

    /// Complete the session in progress and show feedback
    Complete,
}

#[derive(Subcommand)]
enum BlockAction {
    /// Create a block and make it the active one
    Create {
        name: String,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        weeks: Option<u32>,
        /// Week-1 RPE for new exercises
        #[arg(long)]
        rpe: Option<f64>,
    },

    /// Add an exercise to a session of the active block
    ///
    /// The session is created when the block has none by that name.
    AddExercise {
        name: String,
        #[arg(long)]
        session: String,
        #[arg(long, default_value_t = 0.0)]
        one_rep_max: f64,
        #[arg(long)]
        sets: Option<u32>,
        #[arg(long)]
        reps: Option<u32>,
        /// Baseline RPE, defaults to the block's start RPE
        #[arg(long)]
        rpe: Option<f64>,
    },

    /// Show the active block and its next week
    Show,
}

fn main() -> Result<()> {
    rpe_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let problems = config.validate();
    if !problems.is_empty() {
        eprintln!("Configuration errors:");
        for problem in &problems {
            eprintln!("  - {}", problem);
        }
        return Err(Error::Config("Invalid configuration".into()));
    }

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Commands::Load {
            one_rep_max,
            reps,
            rpe,
        } => {
            println!("{}", format_kg(predict_load(one_rep_max, reps, rpe)));
            Ok(())
        }
        Commands::E1rm { load, reps } => {
            println!("{}", format_kg(estimate_one_rep_max(load, reps)));
            Ok(())
        }
        Commands::Rpe {
            load,
            reps,
            one_rep_max,
            target,
        } => cmd_rpe(load, reps, one_rep_max, target),
        Commands::Plan {
            goal,
            weeks,
            rpe,
            sets,
            reps,
            one_rep_max,
        } => cmd_plan(&config, goal, weeks, rpe, sets, reps, one_rep_max),
        Commands::Feedback {
            session,
            block,
            rotation_completed,
        } => cmd_feedback(&session, block.as_deref(), rotation_completed),
        Commands::Progress {
            exercise,
            sessions,
            limit,
            csv,
        } => {
            let sessions_path = sessions.unwrap_or_else(|| data_dir.join("sessions.json"));
            let limit = limit.unwrap_or(config.progress.history_limit);
            cmd_progress(&sessions_path, exercise, limit, csv.as_deref())
        }
        Commands::Search { query } => {
            for name in search_exercises(&query) {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Block { action } => cmd_block(&config, &data_dir, action),
        Commands::Start { date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            cmd_start(&data_dir, date)
        }
        Commands::Log {
            exercise,
            set,
            load,
            reps,
            rpe,
            done,
        } => cmd_log(&data_dir, exercise, set, load, reps, rpe, done),
        Commands::Add {
            name,
            one_rep_max,
            sets,
            reps,
            rpe,
            permanent,
        } => {
            let mut target = config.default_target(one_rep_max);
            target.set_count = sets.unwrap_or(target.set_count);
            target.target_reps = reps.unwrap_or(target.target_reps);
            target.baseline_exertion = clamp_exertion(rpe.unwrap_or(target.baseline_exertion));
            cmd_add(&data_dir, &name, target, permanent)
        }
        Commands::Complete => cmd_complete(&data_dir),
    }
}

fn format_kg(value: Option<f64>) -> String {
    match value {
        Some(kg) => format!("{} kg", kg),
        None => "unknown".to_string(),
    }
}

fn cmd_rpe(load: f64, reps: u32, one_rep_max: f64, target: Option<f64>) -> Result<()> {
    let implied = infer_exertion(load, reps, one_rep_max).map(f64::from);

    match implied {
        Some(rpe) => println!("RPE {}", rpe),
        None => println!("unknown"),
    }

    if let Some(target) = target {
        if let Some(deviation) = classify_exertion_deviation(implied, Some(target)) {
            let label = match deviation {
                ExertionDeviation::OnTarget => "on target",
                ExertionDeviation::ModerateDeviation => "moderate deviation",
                ExertionDeviation::LargeDeviation => "large deviation",
            };
            println!("  vs target {}: {}", target, label);
        }
        if is_underperforming(implied, target) {
            println!("  ⚠ at least 2 RPE points under target");
        }
    }

    Ok(())
}

fn cmd_plan(
    config: &Config,
    goal: Option<String>,
    weeks: Option<u32>,
    rpe: Option<f64>,
    sets: Option<u32>,
    reps: Option<u32>,
    one_rep_max: f64,
) -> Result<()> {
    let goal = match goal {
        Some(g) => BlockGoal::parse(&g)
            .ok_or_else(|| Error::Program(format!("Unknown goal '{}'", g)))?,
        None => config.block.goal,
    };
    let total_weeks = weeks.unwrap_or(config.block.total_weeks).max(1);

    let mut target = config.default_target(one_rep_max);
    if let Some(rpe) = rpe {
        target.baseline_exertion = clamp_exertion(rpe);
    }
    if let Some(sets) = sets {
        target.set_count = sets;
    }
    if let Some(reps) = reps {
        target.target_reps = reps;
    }

    println!(
        "{:?} block, {} weeks, {} x {} from RPE {}",
        goal, total_weeks, target.set_count, target.target_reps, target.baseline_exertion
    );
    println!();

    for (week, targets) in block_outline(&target, total_weeks, goal) {
        let tag = if targets.is_peak_week {
            "  PEAK"
        } else if targets.is_deload_week {
            "  DELOAD"
        } else {
            ""
        };
        let load = predict_load(
            target.one_rep_max,
            target.target_reps,
            targets.effective_exertion,
        );
        let load = load.map(|kg| format!("  {} kg", kg)).unwrap_or_default();

        println!(
            "Week {:>2}  RPE {:<4}  {} sets{}{}",
            week, targets.effective_exertion, targets.effective_set_count, load, tag
        );
    }

    Ok(())
}

fn cmd_feedback(session_path: &Path, block_path: Option<&Path>, rotation_completed: bool) -> Result<()> {
    let session: SessionRecord = serde_json::from_str(&std::fs::read_to_string(session_path)?)?;
    let block: Option<TrainingBlock> = match block_path {
        Some(path) => Some(serde_json::from_str(&std::fs::read_to_string(path)?)?),
        None => None,
    };

    if let Some(block) = &block {
        for problem in block.validate() {
            tracing::warn!("Block '{}': {}", block.name, problem);
        }
    }

    let feedback = classify_session(&session, rotation_completed, block.as_ref());
    print_feedback(&session, &feedback);
    Ok(())
}

fn print_feedback(session: &SessionRecord, feedback: &SessionFeedback) {
    println!("{}", feedback.headline);
    println!("{}", feedback.body);
    println!();
    println!(
        "Sets rated: {} ({} on target, {} pushed, {} too light)",
        feedback.counts.counted,
        feedback.counts.on_target,
        feedback.counts.pushed,
        feedback.counts.underperformed
    );
    println!("Volume: {} kg", feedback.volume);

    for exercise in &session.exercises {
        if let Some(gap) = exertion_shortfall(&exercise.sets, exercise.target_exertion) {
            println!(
                "  ⚠ {}: training {} RPE points under target ({})",
                exercise.name, gap, exercise.target_exertion
            );
        }
    }

    if let Some(message) = &feedback.week_message {
        println!();
        println!("{}", message);
    }
}

fn cmd_progress(
    sessions_path: &Path,
    exercise: Option<String>,
    limit: usize,
    csv: Option<&Path>,
) -> Result<()> {
    let sessions = load_sessions(sessions_path)?;

    let Some(exercise) = exercise else {
        let names = exercise_names(&sessions);
        if names.is_empty() {
            println!("No completed sessions found.");
        }
        for name in names {
            println!("{}", name);
        }
        return Ok(());
    };

    let points = exercise_history(&sessions, &exercise, limit);
    if points.is_empty() {
        println!("No history for {}.", exercise);
        return Ok(());
    }

    println!("{}", exercise);
    for point in &points {
        println!(
            "  {}  e1RM {:>6} kg  best {:>6} kg",
            point.date, point.e1rm, point.best_load
        );
    }
    if let Some(delta) = progress_delta(&points) {
        println!("Change: {:+} kg", delta);
    }

    if let Some(csv_path) = csv {
        write_history_csv(csv_path, &points)?;
        println!("✓ Wrote {} points to {}", points.len(), csv_path.display());
    }

    Ok(())
}

fn active_block_index(blocks: &[TrainingBlock]) -> Result<usize> {
    blocks.iter().position(|b| b.active).ok_or_else(|| {
        Error::Program("No active block. Create one with `rpeplan block create`".into())
    })
}

fn active_session_index(sessions: &[SessionRecord]) -> Result<usize> {
    sessions
        .iter()
        .position(|s| s.status == SessionStatus::Active)
        .ok_or_else(|| Error::Session("No session in progress. Run `rpeplan start`".into()))
}

fn cmd_block(config: &Config, data_dir: &Path, action: BlockAction) -> Result<()> {
    let blocks_path = data_dir.join(BLOCKS_FILE);
    let mut blocks = load_blocks(&blocks_path)?;

    match action {
        BlockAction::Create {
            name,
            goal,
            weeks,
            rpe,
        } => {
            let goal = match goal {
                Some(g) => BlockGoal::parse(&g)
                    .ok_or_else(|| Error::Program(format!("Unknown goal '{}'", g)))?,
                None => config.block.goal,
            };
            let block = TrainingBlock::new(
                &name,
                goal,
                weeks.unwrap_or(config.block.total_weeks),
                rpe.unwrap_or(config.block.start_exertion),
            );
            let id = block.id;
            blocks.push(block);
            set_active_block(&mut blocks, id)?;
            save_blocks(&blocks_path, &blocks)?;
            println!("✓ Created block '{}' ({:?})", name, goal);
        }
        BlockAction::AddExercise {
            name,
            session,
            one_rep_max,
            sets,
            reps,
            rpe,
        } => {
            let idx = active_block_index(&blocks)?;
            let block = &mut blocks[idx];

            let existing = block.session_named(&session).map(|t| t.id);
            let session_id = match existing {
                Some(id) => id,
                None => block.add_session(session.trim()),
            };
            let mut target = block.exercise_target(
                one_rep_max,
                reps.unwrap_or(config.exercise.target_reps),
                sets.unwrap_or(config.exercise.sets),
            );
            if let Some(rpe) = rpe {
                target.baseline_exertion = clamp_exertion(rpe);
            }
            block.add_exercise(session_id, &name, target)?;

            for problem in block.validate() {
                tracing::warn!("Block '{}': {}", block.name, problem);
            }
            println!("✓ Added {} to {}", name, session.trim());
            save_blocks(&blocks_path, &blocks)?;
        }
        BlockAction::Show => {
            let block = &blocks[active_block_index(&blocks)?];
            println!(
                "{} ({:?}), week {} of {}",
                block.name, block.goal, block.current_week, block.total_weeks
            );
            for (i, template) in block.sessions.iter().enumerate() {
                let marker = if i == block.current_index % block.sessions.len() {
                    "→"
                } else {
                    " "
                };
                println!("{} {}", marker, template.name);
                for exercise in &template.exercises {
                    let t = &exercise.target;
                    println!(
                        "    {}  {} x {} from RPE {}",
                        exercise.name, t.set_count, t.target_reps, t.baseline_exertion
                    );
                }
            }
            if let Some(preview) = next_week_preview(block) {
                let tag = if preview.is_peak_week {
                    " (peak)"
                } else if preview.is_deload_week {
                    " (deload)"
                } else {
                    ""
                };
                println!(
                    "Next week {}: RPE {}{}",
                    preview.week, preview.effective_exertion, tag
                );
            }
        }
    }

    Ok(())
}

fn print_session(session: &SessionRecord) {
    println!("{} (week {}, {})", session.session_name, session.week_number, session.date);
    for (i, exercise) in session.exercises.iter().enumerate() {
        let load = exercise.sets.first().and_then(|s| s.entered_load());
        println!(
            "  {}. {}  {} x {} @ RPE {}  {}",
            i + 1,
            exercise.name,
            exercise.sets.len(),
            exercise.target.target_reps,
            exercise.target_exertion,
            format_kg(load)
        );
    }
}

fn cmd_start(data_dir: &Path, date: NaiveDate) -> Result<()> {
    let blocks = load_blocks(&data_dir.join(BLOCKS_FILE))?;
    let sessions_path = data_dir.join(SESSIONS_FILE);
    let mut sessions = load_sessions(&sessions_path)?;

    if let Some(open) = active_session(&sessions) {
        return Err(Error::Session(format!(
            "'{}' from {} is still in progress",
            open.session_name, open.date
        )));
    }

    let block = &blocks[active_block_index(&blocks)?];
    let session = block
        .start_session(date)
        .ok_or_else(|| Error::Program(format!("Block '{}' has no sessions", block.name)))?;

    print_session(&session);
    sessions.push(session);
    save_sessions(&sessions_path, &sessions)
}

fn cmd_log(
    data_dir: &Path,
    exercise: usize,
    set: usize,
    load: Option<f64>,
    reps: Option<u32>,
    rpe: Option<f64>,
    done: bool,
) -> Result<()> {
    if exercise == 0 || set == 0 {
        return Err(Error::Session("Exercise and set numbers start at 1".into()));
    }

    let sessions_path = data_dir.join(SESSIONS_FILE);
    let mut sessions = load_sessions(&sessions_path)?;
    let idx = active_session_index(&sessions)?;
    let session = &mut sessions[idx];

    let (exercise_idx, set_idx) = (exercise - 1, set - 1);
    if let Some(load) = load {
        session.edit_set(exercise_idx, set_idx, SetEdit::Load(Some(load)))?;
    }
    if let Some(reps) = reps {
        session.edit_set(exercise_idx, set_idx, SetEdit::Reps(Some(reps)))?;
    }
    if let Some(rpe) = rpe {
        session.edit_set(exercise_idx, set_idx, SetEdit::Exertion(Some(rpe)))?;
    }
    if done {
        session.edit_set(exercise_idx, set_idx, SetEdit::Completed(true))?;
    }

    let logged = session
        .exercises
        .get(exercise_idx)
        .ok_or_else(|| Error::Session(format!("No exercise {}", exercise)))?;
    let performed = logged
        .sets
        .get(set_idx)
        .ok_or_else(|| Error::Session(format!("No set {} for {}", set, logged.name)))?;
    let exertion = performed.reported_exertion;
    println!(
        "{} set {}: {} x {} @ RPE {}",
        logged.name,
        set,
        format_kg(performed.entered_load()),
        performed.entered_reps().map(|r| r.to_string()).unwrap_or_else(|| "?".into()),
        exertion.map(|e| e.to_string()).unwrap_or_else(|| "?".into())
    );
    if is_underperforming(exertion, logged.target_exertion) {
        println!("  ⚠ at least 2 RPE points under target ({})", logged.target_exertion);
    }

    save_sessions(&sessions_path, &sessions)
}

fn cmd_add(data_dir: &Path, name: &str, target: ExerciseTarget, permanent: bool) -> Result<()> {
    let sessions_path = data_dir.join(SESSIONS_FILE);
    let mut sessions = load_sessions(&sessions_path)?;
    let idx = active_session_index(&sessions)?;

    if permanent {
        let blocks_path = data_dir.join(BLOCKS_FILE);
        let mut blocks = load_blocks(&blocks_path)?;
        let session = &mut sessions[idx];
        let block = blocks
            .iter_mut()
            .find(|b| Some(b.id) == session.program_id)
            .ok_or_else(|| Error::Program("Session's block no longer exists".into()))?;
        session.add_permanent_exercise(block, name, target)?;
        save_blocks(&blocks_path, &blocks)?;
        println!("✓ Added {} to this session and its template", name);
    } else {
        sessions[idx].add_exercise(name, target)?;
        println!("✓ Added {} to this session", name);
    }

    save_sessions(&sessions_path, &sessions)
}

fn cmd_complete(data_dir: &Path) -> Result<()> {
    let blocks_path = data_dir.join(BLOCKS_FILE);
    let sessions_path = data_dir.join(SESSIONS_FILE);
    let mut blocks = load_blocks(&blocks_path)?;
    let mut sessions = load_sessions(&sessions_path)?;

    let idx = active_session_index(&sessions)?;
    let session = &mut sessions[idx];
    let block = blocks
        .iter_mut()
        .find(|b| Some(b.id) == session.program_id)
        .ok_or_else(|| Error::Program("Session's block no longer exists".into()))?;

    let outcome = session.complete(block)?;
    let feedback = classify_session(session, outcome.rotation_completed, Some(&*block));
    print_feedback(session, &feedback);

    save_blocks(&blocks_path, &blocks)?;
    save_sessions(&sessions_path, &sessions)
}
