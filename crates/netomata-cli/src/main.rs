//! Netomata CLI - run network automata experiments.
//!
//! Experiments are described in JSON (see [`experiment`]) or built from the
//! shorthand subcommands for the common models.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netomata_automaton::{EvolveConfig, RuleTable};
use netomata_core::Boundary;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod experiment;
mod output;

use commands::{config as config_cmd, run};
use config::Config;
use experiment::{Experiment, ExperimentSpec, InitialSpec};

/// Netomata CLI - evolve activities over a directed graph.
#[derive(Parser, Debug)]
#[command(
    name = "ntm",
    author,
    version,
    about = "Netomata: run network automata experiments",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Seed for the run, overriding the experiment and configuration.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Output format: text or json.
    #[arg(short, long, global = true)]
    format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an experiment described in a JSON file.
    Run {
        /// Path to the experiment file.
        experiment: PathBuf,

        /// Override the number of timesteps.
        #[arg(long)]
        steps: Option<usize>,

        /// Keep only the trailing window of the history.
        #[arg(long)]
        compress: bool,
    },

    /// Elementary cellular automaton.
    Elementary {
        /// Rule number, 0 to 255.
        rule: u8,

        #[command(flatten)]
        line: LineArgs,
    },

    /// Totalistic cellular automaton with `k` colours.
    Totalistic {
        /// Number of colours.
        k: u8,

        /// Rule number, read as base-k digits indexed by neighbourhood sum.
        rule: u64,

        /// Neighbourhood radius.
        #[arg(long, default_value_t = 1)]
        radius: usize,

        /// Do not wrap around at the ends; edge cells see fewer neighbours.
        #[arg(long)]
        open: bool,

        #[command(flatten)]
        line: LineArgs,
    },

    /// Second-order reversible elementary automaton.
    Reversible {
        /// Rule number, 0 to 255.
        rule: u8,

        /// Number of cells.
        #[arg(short, long, default_value_t = 101)]
        width: usize,

        /// Timesteps to compute.
        #[arg(short, long)]
        steps: Option<usize>,
    },

    /// Hopfield network recall.
    Hopfield {
        /// Stored pattern as a 0/1 string (repeat for several).
        #[arg(short, long = "pattern", required = true)]
        patterns: Vec<String>,

        /// Probe to recall from, as a 0/1 string.
        #[arg(long)]
        probe: String,

        /// Row width used when printing.
        #[arg(long, default_value_t = 5)]
        columns: usize,

        /// Timesteps to compute (one node update each).
        #[arg(short, long)]
        steps: Option<usize>,
    },

    /// Turing machine with a transition table read from JSON.
    Turing {
        /// Path to the transition table.
        table: PathBuf,

        /// Initial tape, one digit per cell.
        #[arg(long)]
        tape: String,

        /// Starting head position.
        #[arg(long, default_value_t = 0)]
        head: usize,

        /// Starting head state.
        #[arg(long, default_value_t = 1)]
        state: u32,

        /// Timesteps to compute.
        #[arg(short, long)]
        steps: Option<usize>,
    },

    /// Resource-driven network growth on a lattice.
    Fungal {
        #[arg(long, default_value_t = 20)]
        rows: usize,

        #[arg(long, default_value_t = 20)]
        cols: usize,

        /// Resource placed on the centre cell.
        #[arg(long, default_value_t = 80_000.0)]
        resource: f64,

        /// Timesteps to compute.
        #[arg(short, long)]
        steps: Option<usize>,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Arguments shared by the 1-D automata.
#[derive(clap::Args, Debug)]
struct LineArgs {
    /// Number of cells.
    #[arg(short, long, default_value_t = 101)]
    width: usize,

    /// Timesteps to compute.
    #[arg(short, long)]
    steps: Option<usize>,

    /// Start from random cells instead of a single centre cell.
    #[arg(long)]
    random: bool,
}

impl LineArgs {
    fn initial(&self) -> InitialSpec {
        if self.random {
            InitialSpec::Random { span: None }
        } else {
            InitialSpec::Single
        }
    }
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Show path to config file.
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity; RUST_LOG wins when set
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load()?;
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(format) = &cli.format {
        config.output_format = format.parse()?;
    }

    let shorthand = |model: ExperimentSpec, steps: Option<usize>| {
        let evolve = EvolveConfig {
            timesteps: steps.unwrap_or(config.default_timesteps),
            ..EvolveConfig::default()
        };
        Experiment::new(model, evolve)
    };

    let experiment = match cli.command {
        Commands::Run {
            experiment,
            steps,
            compress,
        } => {
            let mut experiment = Experiment::load(&experiment)?;
            if let Some(steps) = steps {
                experiment.evolve.timesteps = steps;
            }
            if compress {
                experiment.evolve.compression = true;
            }
            experiment
        }

        Commands::Elementary { rule, line } => shorthand(
            ExperimentSpec::Elementary {
                rule,
                width: line.width,
                initial: line.initial(),
                boundary: Boundary::Periodic,
            },
            line.steps,
        ),

        Commands::Totalistic {
            k,
            rule,
            radius,
            open,
            line,
        } => shorthand(
            ExperimentSpec::Totalistic {
                k,
                rule,
                width: line.width,
                radius,
                initial: line.initial(),
                boundary: if open { Boundary::Open } else { Boundary::Periodic },
            },
            line.steps,
        ),

        Commands::Reversible { rule, width, steps } => shorthand(
            ExperimentSpec::Reversible {
                rule,
                width,
                initial: InitialSpec::Single,
                past: None,
            },
            steps,
        ),

        Commands::Hopfield {
            patterns,
            probe,
            columns,
            steps,
        } => shorthand(
            ExperimentSpec::Hopfield {
                patterns,
                probe,
                threshold: 0.0,
                columns,
            },
            steps,
        ),

        Commands::Turing {
            table,
            tape,
            head,
            state,
            steps,
        } => {
            let contents = std::fs::read_to_string(&table)
                .with_context(|| format!("Failed to read rule table from {}", table.display()))?;
            let table: RuleTable = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse rule table {}", table.display()))?;
            shorthand(
                ExperimentSpec::Turing {
                    table,
                    tape,
                    head,
                    state,
                },
                steps,
            )
        }

        Commands::Fungal {
            rows,
            cols,
            resource,
            steps,
        } => shorthand(
            ExperimentSpec::Fungal {
                rows,
                cols,
                initial_resource: resource,
                transfer: None,
                growth_threshold: None,
                prune_threshold: None,
            },
            steps,
        ),

        Commands::Config(ConfigCommands::Show) => return config_cmd::show(&config),
        Commands::Config(ConfigCommands::Path) => return config_cmd::path(),
    };

    run::execute(&config, experiment)
}
