//! rforest CLI: train and evaluate sparse binary random forests.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt};

use rforest::config::MAX_SUPPORTED_DEPTH;
use rforest::error::EXIT_INTERRUPTED;
use rforest::{
    BootstrapPolicy, ConfigError, ForestConfig, Interrupt, Parallelism, Predictor, RandomForestTrainer,
    TreeParams, data, load_forest, read_samples, report, save_forest,
};

#[derive(Parser)]
#[command(name = "rforest")]
#[command(about = "Random forest for sparse binary classification")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by training and testing.
#[derive(Args)]
struct RunArgs {
    /// Worker threads: 0 = sequential, negative = all hardware threads
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    parallel: i32,

    /// Maximum tree depth; must match between train and test
    #[arg(short = 'd', long, default_value_t = 10)]
    max_depth: u32,
}

#[derive(Clone, Copy, ValueEnum)]
enum Bootstrap {
    /// Sample indices may repeat
    With,
    /// Sample indices are distinct
    Without,
}

impl From<Bootstrap> for BootstrapPolicy {
    fn from(value: Bootstrap) -> Self {
        match value {
            Bootstrap::With => BootstrapPolicy::WithReplacement,
            Bootstrap::Without => BootstrapPolicy::WithoutReplacement,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a forest from labeled training data
    Train {
        /// Training data (`label index:value ...` per line)
        data: PathBuf,

        #[command(flatten)]
        run: RunArgs,

        /// Child partitions of this size or less become leaves
        #[arg(long = "min-split", default_value_t = 2)]
        min_samples_split: usize,

        /// Number of trees
        #[arg(short = 'c', long, default_value_t = 100)]
        tree_count: usize,

        /// Samples drawn per tree
        #[arg(long = "sample-size", default_value_t = 1000)]
        one_sample_size: usize,

        /// Number of features (default: largest index in the data + 1)
        #[arg(long)]
        features: Option<usize>,

        /// Candidate features per node (default: sqrt of feature count)
        #[arg(long)]
        max_features: Option<usize>,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Per-tree sampling policy
        #[arg(long, value_enum, default_value_t = Bootstrap::Without)]
        bootstrap: Bootstrap,

        /// Output model file
        #[arg(short, long, default_value = "tree.bin")]
        output: PathBuf,
    },

    /// Score test data with a trained forest
    Test {
        /// Test data (`label index:value ...` per line)
        data: PathBuf,

        #[command(flatten)]
        run: RunArgs,

        /// Trained model file
        #[arg(short, long, default_value = "tree.bin")]
        model: PathBuf,

        /// Output CSV of per-sample class-0 vote ratios
        #[arg(short, long, default_value = "result.csv")]
        output: PathBuf,

        /// Optional CSV of raw per-sample vote counts
        #[arg(long)]
        votes: Option<PathBuf>,

        /// Reject trees splitting on features at or above this count
        #[arg(long)]
        features: Option<usize>,
    },
}

/// Whether a run completed or was stopped early and checkpointed.
enum RunStatus {
    Completed,
    Interrupted,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let interrupt = install_interrupt_handler();

    let result = match cli.command {
        Commands::Train {
            data,
            run,
            min_samples_split,
            tree_count,
            one_sample_size,
            features,
            max_features,
            seed,
            bootstrap,
            output,
        } => {
            let tree = TreeParams {
                max_depth: run.max_depth,
                min_samples_split,
                max_features,
            };
            let parallelism = Parallelism::from_threads(run.parallel);
            cmd_train(
                &data,
                &output,
                TrainSettings {
                    tree,
                    tree_count,
                    one_sample_size,
                    features,
                    bootstrap: bootstrap.into(),
                    parallelism,
                    seed,
                },
                &interrupt,
            )
        }
        Commands::Test {
            data,
            run,
            model,
            output,
            votes,
            features,
        } => cmd_test(
            &data,
            &model,
            &output,
            votes.as_deref(),
            features,
            &run,
            &interrupt,
        ),
    };

    match result {
        Ok(RunStatus::Completed) => ExitCode::SUCCESS,
        Ok(RunStatus::Interrupted) => ExitCode::from(EXIT_INTERRUPTED),
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // logs go to stderr
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn install_interrupt_handler() -> Interrupt {
    let interrupt = Interrupt::new();
    let handle = interrupt.clone();
    let installed = ctrlc::set_handler(move || {
        if handle.request() {
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
        tracing::warn!("interrupt received; finishing running jobs (Ctrl-C again to abort)");
    });
    if let Err(e) = installed {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
    }
    interrupt
}

struct TrainSettings {
    tree: TreeParams,
    tree_count: usize,
    one_sample_size: usize,
    features: Option<usize>,
    bootstrap: BootstrapPolicy,
    parallelism: Parallelism,
    seed: u64,
}

fn cmd_train(
    data_path: &Path,
    output: &Path,
    settings: TrainSettings,
    interrupt: &Interrupt,
) -> rforest::Result<RunStatus> {
    let start = Instant::now();
    let samples = read_samples(data_path, settings.parallelism)?;
    let features_count = settings
        .features
        .unwrap_or_else(|| data::infer_features_count(&samples));

    let config = ForestConfig::builder()
        .features_count(features_count)
        .tree_count(settings.tree_count)
        .one_sample_size(settings.one_sample_size)
        .tree(settings.tree)
        .bootstrap(settings.bootstrap)
        .parallelism(settings.parallelism)
        .seed(settings.seed)
        .build()?;

    let outcome = RandomForestTrainer::new(config).train(&samples, interrupt)?;
    save_forest(&outcome.forest, output)?;

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "train finished"
    );
    Ok(if outcome.interrupted {
        RunStatus::Interrupted
    } else {
        RunStatus::Completed
    })
}

fn cmd_test(
    data_path: &Path,
    model: &Path,
    output: &Path,
    votes_path: Option<&Path>,
    features: Option<usize>,
    run: &RunArgs,
    interrupt: &Interrupt,
) -> rforest::Result<RunStatus> {
    let start = Instant::now();
    if run.max_depth == 0 || run.max_depth > MAX_SUPPORTED_DEPTH {
        return Err(ConfigError::InvalidMaxDepth(run.max_depth).into());
    }
    let parallelism = Parallelism::from_threads(run.parallel);
    let samples = read_samples(data_path, parallelism)?;
    let forest = load_forest(model, run.max_depth, features)?;

    let outcome = Predictor::new(&forest, parallelism).score(&samples, interrupt)?;
    report::save_scores(output, &outcome.votes)?;
    if let Some(path) = votes_path {
        report::save_votes(path, &outcome.votes)?;
    }

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "test finished"
    );
    Ok(if outcome.interrupted {
        RunStatus::Interrupted
    } else {
        RunStatus::Completed
    })
}
