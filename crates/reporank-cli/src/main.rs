//! RepoRank CLI
//!
//! The `reporank` command ranks repositories from classified changes and
//! reports how rankings moved since the previous run of each mode.
//!
//! ## Commands
//!
//! - `compare`: Score a batch of classifications and record one run per mode
//! - `history`: List stored runs for a mode
//! - `show`: Print the latest stored run for a mode
//! - `weights`: Print the effective weight table

mod dispatch;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use reporank_core::{
    emit_record_rejected, parse_monitored_repos, ClassificationBatch, ComparisonEngine,
    ComparisonRun, EngineConfig, Mode, RankingCycle, WeightTable, METRICS,
};
use reporank_state::{JsonlRunHistory, MemoryRunHistory, RunHistory};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "reporank")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Repository scoring, ranking and rank-shift detection", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the run history and notification log
    #[arg(
        long,
        global = true,
        env = "REPORANK_DATA_DIR",
        default_value = ".reporank"
    )]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank repositories from a JSONL file of classifications
    Compare(CompareArgs),

    /// List stored runs for a mode, newest first
    History {
        /// Mode to list
        #[arg(short, long)]
        mode: Mode,

        /// Maximum number of runs to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Print the latest stored run for a mode
    Show {
        /// Mode to show
        #[arg(short, long)]
        mode: Mode,
    },

    /// Print the effective weight table
    Weights {
        /// JSON file overlaying per-mode weights onto the defaults
        #[arg(long, env = "REPORANK_WEIGHTS")]
        weights: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Classification records, one JSON object per line
    #[arg(short, long)]
    input: PathBuf,

    /// Mode to compute (repeatable; default: all modes)
    #[arg(
        short,
        long = "mode",
        env = "REPORANK_MODES",
        value_delimiter = ','
    )]
    modes: Vec<Mode>,

    /// Smallest rank change that is reported
    #[arg(long, env = "REPORANK_MIN_SHIFT", default_value_t = 1)]
    min_shift: u32,

    /// JSON file overlaying per-mode weights onto the defaults
    #[arg(long, env = "REPORANK_WEIGHTS")]
    weights: Option<PathBuf>,

    /// Comma-separated GitHub URLs; records for other repositories are dropped
    #[arg(long, env = "MONITORED_REPOS")]
    repos: Option<String>,

    /// Compute against stored history without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    reporank_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Compare(args) => cmd_compare(&cli.data_dir, args).await,
        Commands::History { mode, limit } => cmd_history(&cli.data_dir, mode, limit).await,
        Commands::Show { mode } => cmd_show(&cli.data_dir, mode).await,
        Commands::Weights { weights } => cmd_weights(weights.as_deref()),
    }
}

/// Load the weight table, overlaying `path` onto the defaults when given.
fn load_weights(path: Option<&Path>) -> Result<WeightTable> {
    match path {
        None => Ok(WeightTable::default()),
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read weights file {}", path.display()))?;
            WeightTable::from_json_str(&raw)
                .with_context(|| format!("Invalid weights file {}", path.display()))
        }
    }
}

fn engine_config(args: &CompareArgs) -> Result<EngineConfig> {
    let mut config = EngineConfig::default()
        .with_weights(load_weights(args.weights.as_deref())?)
        .with_min_shift(args.min_shift);
    if !args.modes.is_empty() {
        config = config.with_modes(args.modes.iter().copied());
    }
    config.validate()?;
    Ok(config)
}

/// Input batch after validation and the monitored-repository filter.
#[derive(Debug)]
struct LoadedBatch {
    batch: ClassificationBatch,
    rejected: usize,
    /// Valid records dropped because their repository is not monitored.
    unmonitored: usize,
}

/// Read and validate the input batch, restricted to monitored repositories.
async fn load_batch(args: &CompareArgs) -> Result<LoadedBatch> {
    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let (batch, rejected) = ClassificationBatch::from_json_lines(&raw);
    for record in &rejected {
        emit_record_rejected(record.index, record.repo_url.as_deref(), &record.reason);
    }

    let monitored = match &args.repos {
        Some(list) => parse_monitored_repos(list)?,
        None => Vec::new(),
    };
    let valid = batch.len();
    let batch = if monitored.is_empty() {
        batch
    } else {
        batch.retain_repos(&monitored)
    };
    Ok(LoadedBatch {
        unmonitored: valid - batch.len(),
        batch,
        rejected: rejected.len(),
    })
}

/// Score a batch, record one run per mode, and dispatch notifications.
async fn cmd_compare(data_dir: &Path, args: CompareArgs) -> Result<()> {
    let config = engine_config(&args)?;
    let loaded = load_batch(&args).await?;
    METRICS.add_records(loaded.batch.len() as u64, loaded.rejected as u64);
    if loaded.unmonitored > 0 {
        info!(
            event = "records.unmonitored",
            dropped = loaded.unmonitored,
            "Dropped records for unmonitored repositories"
        );
    }

    // Dry runs work on an in-memory copy of the stored history.
    let store = if args.dry_run {
        None
    } else {
        Some(Arc::new(JsonlRunHistory::open(data_dir).await.with_context(
            || format!("Failed to open history at {}", data_dir.display()),
        )?))
    };
    let history: Arc<dyn RunHistory> = match &store {
        Some(store) => store.clone(),
        None => {
            let existing = JsonlRunHistory::open_read_only(data_dir)
                .read_all()
                .await
                .context("Failed to read run history")?;
            Arc::new(MemoryRunHistory::seeded(existing))
        }
    };

    let cycle = RankingCycle::new(ComparisonEngine::new(config), history);
    let report = cycle.run(loaded.batch).await?;

    if report.is_skipped() {
        info!("No classification records to compare");
        METRICS.flush();
        return Ok(());
    }

    for run in &report.runs {
        println!("{}", serde_json::to_string(&run.run)?);
    }

    let sent = dispatch::dispatch(&report, store.as_deref()).await?;

    info!(
        cycle_id = %report.cycle_id,
        modes = report.runs.len(),
        shifts = report.total_shifts(),
        notifications = sent,
        high = report.high_severity_count(),
        dry_run = args.dry_run,
        "Comparison complete"
    );
    METRICS.flush();
    Ok(())
}

/// List stored runs for a mode
async fn cmd_history(data_dir: &Path, mode: Mode, limit: usize) -> Result<()> {
    let history = JsonlRunHistory::open_read_only(data_dir);
    let runs = history.list(mode.as_str(), limit).await?;

    if runs.is_empty() {
        println!("No runs recorded for mode '{mode}'");
        return Ok(());
    }

    println!("Runs for mode '{mode}' (newest first):");
    for stored in runs {
        let leader = serde_json::from_value::<ComparisonRun>(stored.payload.clone())
            .ok()
            .and_then(|run| run.leader().map(|r| r.repo_url.clone()))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {}  {}  {}",
            stored.run_id,
            stored.recorded_at.to_rfc3339(),
            stored.short_digest(),
            leader
        );
    }
    Ok(())
}

/// Print the latest stored run for a mode
async fn cmd_show(data_dir: &Path, mode: Mode) -> Result<()> {
    let history = JsonlRunHistory::open_read_only(data_dir);
    match history.latest(mode.as_str()).await? {
        Some(stored) => println!("{}", serde_json::to_string_pretty(&stored.payload)?),
        None => println!("No runs recorded for mode '{mode}'"),
    }
    Ok(())
}

/// Print the effective weight table
fn cmd_weights(path: Option<&Path>) -> Result<()> {
    let table = load_weights(path)?;
    println!(
        "{:<10} {:>7} {:>11} {:>13} {:>14}",
        "mode", "impact", "confidence", "feature_bias", "security_bias"
    );
    for (mode, w) in table.rows() {
        println!(
            "{:<10} {:>7.2} {:>11.2} {:>13.2} {:>14.2}",
            mode.as_str(),
            w.impact,
            w.confidence,
            w.feature_bias,
            w.security_bias
        );
    }
    println!("fallback: {}", table.fallback());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const INPUT: &str = concat!(
        "{\"repo_url\": \"https://github.com/o/a\", \"change_type\": \"feature\", \"impact_level\": \"high\", \"confidence\": 0.9}\n",
        "{\"repo_url\": \"https://github.com/o/b\", \"change_type\": \"fix\", \"impact_level\": \"low\", \"confidence\": 0.4}\n",
        "{\"change_type\": \"fix\", \"impact_level\": \"high\"}\n",
        "{\"repo_url\": \"https://github.com/o/c\", \"impact_level\": \"medium\", \"confidence\": 0.7}\n",
    );

    fn compare_args(input: PathBuf) -> CompareArgs {
        CompareArgs {
            input,
            modes: vec![Mode::Executive],
            min_shift: 1,
            weights: None,
            repos: None,
            dry_run: false,
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compare_parses_repeated_and_delimited_modes() {
        let cli = Cli::try_parse_from([
            "reporank",
            "compare",
            "--input",
            "in.jsonl",
            "--mode",
            "security",
            "--mode",
            "technical,use_case",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Compare(args) => {
                assert_eq!(
                    args.modes,
                    vec![Mode::Security, Mode::Technical, Mode::Usecase]
                );
                assert!(args.dry_run);
            }
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let parsed = Cli::try_parse_from(["reporank", "show", "--mode", "board"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_zero_min_shift_fails_config() {
        let mut args = compare_args(PathBuf::from("unused"));
        args.min_shift = 0;
        assert!(engine_config(&args).is_err());
    }

    #[test]
    fn test_load_weights_overlays_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        std::fs::write(
            &path,
            r#"{"security": {"impact": 0.4, "confidence": 0.2, "security_bias": 0.4}}"#,
        )
        .unwrap();

        let table = load_weights(Some(&path)).unwrap();
        assert_eq!(table.weights_for(Mode::Security).security_bias, 0.4);
        assert_eq!(
            table.weights_for(Mode::Executive),
            WeightTable::default().weights_for(Mode::Executive)
        );
    }

    #[tokio::test]
    async fn test_load_batch_drops_invalid_and_unmonitored_records() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        std::fs::write(&input, INPUT).unwrap();

        let mut args = compare_args(input);
        let loaded = load_batch(&args).await.unwrap();
        assert_eq!(loaded.batch.len(), 3);
        assert_eq!(loaded.rejected, 1);
        assert_eq!(loaded.unmonitored, 0);

        args.repos = Some("https://github.com/o/a.git, https://github.com/o/c/".to_string());
        let loaded = load_batch(&args).await.unwrap();
        let repos: Vec<&str> = loaded.batch.records().iter().map(|r| r.repo_url()).collect();
        assert_eq!(repos, vec!["https://github.com/o/a", "https://github.com/o/c"]);
        // Only monitored records count as accepted.
        assert_eq!(loaded.rejected, 1);
        assert_eq!(loaded.unmonitored, 1);
    }

    #[tokio::test]
    async fn test_compare_records_runs_unless_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        std::fs::write(&input, INPUT).unwrap();
        let data_dir = dir.path().join("data");

        let mut args = compare_args(input.clone());
        args.dry_run = true;
        cmd_compare(&data_dir, args).await.unwrap();
        assert!(!data_dir.exists());

        cmd_compare(&data_dir, compare_args(input)).await.unwrap();
        let store = JsonlRunHistory::open_read_only(&data_dir);
        let runs = store.read_all().await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].mode, "executive");

        let run: ComparisonRun = serde_json::from_value(runs[0].payload.clone()).unwrap();
        assert_eq!(run.leader().unwrap().repo_url, "https://github.com/o/a");
    }

    #[tokio::test]
    async fn test_read_commands_do_not_create_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");

        cmd_history(&data_dir, Mode::Executive, 5).await.unwrap();
        cmd_show(&data_dir, Mode::Security).await.unwrap();
        assert!(!data_dir.exists());
    }
}
