//! Gobblet Gobblers Solver
//!
//! Solves the game by retrograde analysis and queries the resulting table.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use gobblers_core::{compress, Key, State};
use gobblers_solver::checkpoint::Checkpoint;
use gobblers_solver::export::export_sqlite;
use gobblers_solver::stats::format_bytes;
use gobblers_solver::{store, Metadata, SolveStatus, Solver, SolverConfig};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "solver")]
#[command(version, about = "Retrograde solver for Gobblet Gobblers", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve from the start position (or one root) and save the table
    Solve(SolveArgs),

    /// Print what the table knows about one position
    Lookup {
        /// Outcome record file
        #[arg(long, default_value = "data/outcomes.csv")]
        table: PathBuf,

        /// Position key
        key: Key,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Follow best moves from a position
    Line {
        #[arg(long, default_value = "data/outcomes.csv")]
        table: PathBuf,

        /// Position key (defaults to the start position)
        key: Option<Key>,
    },

    /// Export the table to SQLite
    ExportSqlite {
        #[arg(long, default_value = "data/outcomes.csv")]
        table: PathBuf,

        #[arg(long, default_value = "data/tablebase.db")]
        db: PathBuf,
    },

    /// Check every entry of a table against the rules
    Verify {
        #[arg(long, default_value = "data/outcomes.csv")]
        table: PathBuf,
    },
}

#[derive(Args)]
struct SolveArgs {
    /// Where to write outcome records
    #[arg(long, default_value = "data/outcomes.csv")]
    out: PathBuf,

    /// Binary checkpoint written during the run
    #[arg(long, default_value = "data/solver.bin")]
    checkpoint: PathBuf,

    /// Start from the existing records and checkpoint
    #[arg(long)]
    resume: bool,

    /// Stop once the table holds this many positions
    #[arg(long)]
    max_table: Option<usize>,

    /// Stop once the work stack grows this deep
    #[arg(long)]
    max_depth: Option<usize>,

    /// Seconds between progress lines
    #[arg(long, default_value_t = 5)]
    log_interval: u64,

    /// Seconds between checkpoints
    #[arg(long, default_value_t = 60)]
    checkpoint_interval: u64,

    /// Solve only this position instead of the start
    #[arg(long)]
    root: Option<Key>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .init();

    match cli.command {
        Commands::Solve(args) => solve(args),
        Commands::Lookup { table, key, json } => lookup(&table, key, json),
        Commands::Line { table, key } => line(&table, key),
        Commands::ExportSqlite { table, db } => export(&table, &db),
        Commands::Verify { table } => verify(&table),
    }
}

fn solve(args: SolveArgs) -> Result<()> {
    // Set up SIGINT handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        warn!("Interrupt received, stopping after the current position...");
        r.store(false, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler")?;

    for path in [&args.out, &args.checkpoint] {
        ensure_parent(path)?;
    }

    let mut config = SolverConfig::new()
        .with_log_interval(Duration::from_secs(args.log_interval))
        .with_checkpoint(&args.checkpoint, Duration::from_secs(args.checkpoint_interval))
        .with_running(running);
    if let Some(max) = args.max_table {
        config = config.with_max_table_size(max);
    }
    if let Some(max) = args.max_depth {
        config = config.with_max_stack_depth(max);
    }
    let mut solver = Solver::with_config(config);

    if args.resume {
        if args.out.exists() {
            let count = solver
                .load(&args.out)
                .with_context(|| format!("loading {}", args.out.display()))?;
            info!("Loaded {} positions from {}", count, args.out.display());
        }
        if args.checkpoint.exists() {
            let count = solver
                .load_checkpoint(&args.checkpoint)
                .with_context(|| format!("loading {}", args.checkpoint.display()))?;
            info!("Loaded {} positions from {}", count, args.checkpoint.display());
        }
    }

    let start = Instant::now();
    let status = match args.root {
        Some(key) => {
            info!("Solving {}", key);
            solver.solve(key)?
        }
        None => {
            info!("Solving every first move, then the start position");
            solver.solve_from_start()?
        }
    };
    info!("Run finished in {:.2}s", start.elapsed().as_secs_f64());
    solver.stats.log_summary();

    let count = solver
        .save(&args.out)
        .with_context(|| format!("saving {}", args.out.display()))?;
    info!("Saved {} positions to {}", count, args.out.display());
    info!(
        "Writing checkpoint of about {} to {}",
        format_bytes(Checkpoint::estimate_size(count) as u64),
        args.checkpoint.display()
    );
    Checkpoint::save(&args.checkpoint, solver.table())
        .with_context(|| format!("saving {}", args.checkpoint.display()))?;

    match status {
        SolveStatus::Complete(meta) => println!("Result: {}", describe(&meta)),
        SolveStatus::Interrupted => println!("Solve was interrupted before completion."),
        SolveStatus::LimitReached(limit) => println!("Solve stopped at the {}.", limit),
    }
    Ok(())
}

fn lookup(table: &Path, key: Key, json: bool) -> Result<()> {
    let table = load_table(table)?;
    let meta = table
        .get(key)
        .with_context(|| format!("position {} is not in the table", key))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    } else {
        println!("{}: {}", key, describe(&meta));
    }
    Ok(())
}

fn line(table: &Path, key: Option<Key>) -> Result<()> {
    let table = load_table(table)?;
    let key = key.unwrap_or_else(|| compress(&State::new()));

    for (ply, (key, meta)) in table.principal_line(key)?.into_iter().enumerate() {
        println!("{:>3}. {:>16}  {}", ply, key, describe(&meta));
    }
    Ok(())
}

fn export(table: &Path, db: &Path) -> Result<()> {
    let table = load_table(table)?;
    ensure_parent(db)?;
    let count = export_sqlite(&table, db)?;
    println!("Exported {} positions to {}", count, db.display());
    Ok(())
}

fn verify(table: &Path) -> Result<()> {
    let loaded = load_table(table)?;
    let issues = loaded.audit();
    for issue in &issues {
        println!("{}", issue);
    }
    if !issues.is_empty() {
        bail!("{} of {} entries failed verification", issues.len(), loaded.len());
    }
    println!("All {} entries verified", loaded.len());
    Ok(())
}

fn load_table(path: &Path) -> Result<gobblers_solver::OutcomeTable> {
    let start = Instant::now();
    let table = store::load(path).with_context(|| format!("loading {}", path.display()))?;
    info!(
        "Loaded {} positions in {:.2}s",
        table.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(table)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

fn describe(meta: &Metadata) -> String {
    match meta.best_move {
        Some(mv) => format!("{:?} in {} via {}", meta.outcome, meta.distance, mv),
        None => format!("{:?} in {}", meta.outcome, meta.distance),
    }
}
