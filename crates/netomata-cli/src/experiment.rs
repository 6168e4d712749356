//! JSON experiment descriptions and how to run them.
//!
//! ```json
//! {
//!   "name": "rule 30",
//!   "evolve": { "timesteps": 50, "seed": 3 },
//!   "model": { "kind": "elementary", "rule": 30, "width": 101 }
//! }
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use netomata_automaton::models::{
    FungalGrowth, HeadMover, HeadRule, HopfieldNet, TapeRow, TuringMachine,
};
use netomata_automaton::rules::{ElementaryRule, TotalisticRule};
use netomata_automaton::{
    init, seeded, ActivityHistory, ActivityRule, Alphabet, EvolveConfig, Evolution,
    ReversibleRule, RuleTable,
};
use netomata_core::{ring, Boundary};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::output::{NetworkFrame, Outcome, Row};

/// A named model plus the engine settings to run it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub evolve: EvolveConfig,
    pub model: ExperimentSpec,
}

/// Which model to run and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExperimentSpec {
    /// Elementary rule over `[left, self, right]`.
    Elementary {
        rule: u8,
        width: usize,
        #[serde(default)]
        initial: InitialSpec,
        #[serde(default)]
        boundary: Boundary,
    },
    /// `k`-colour totalistic rule over a ring of the given radius.
    Totalistic {
        k: u8,
        rule: u64,
        width: usize,
        #[serde(default = "default_radius")]
        radius: usize,
        #[serde(default)]
        initial: InitialSpec,
        #[serde(default)]
        boundary: Boundary,
    },
    /// Second-order reversible elementary rule. `past` defaults to `initial`.
    Reversible {
        rule: u8,
        width: usize,
        #[serde(default)]
        initial: InitialSpec,
        #[serde(default)]
        past: Option<InitialSpec>,
    },
    /// Hopfield recall of a probe against binary patterns given as `0`/`1` strings.
    Hopfield {
        patterns: Vec<String>,
        probe: String,
        #[serde(default)]
        threshold: f64,
        /// Row width used when printing.
        #[serde(default = "default_columns")]
        columns: usize,
    },
    /// Turing machine; `tape` is one digit per cell.
    Turing {
        table: RuleTable,
        tape: String,
        head: usize,
        state: u32,
    },
    /// Resource-driven network growth on a `rows x cols` lattice.
    Fungal {
        rows: usize,
        cols: usize,
        initial_resource: f64,
        #[serde(default)]
        transfer: Option<f64>,
        #[serde(default)]
        growth_threshold: Option<f64>,
        #[serde(default)]
        prune_threshold: Option<f64>,
    },
}

fn default_radius() -> usize {
    1
}

fn default_columns() -> usize {
    5
}

/// Initial cells of a 1-D model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialSpec {
    /// One cell set to 1 at the centre.
    #[default]
    Single,
    /// Random states; restricted to a centred span when given.
    Random {
        #[serde(default)]
        span: Option<usize>,
    },
    /// Explicit cells, one digit each.
    Cells { cells: String },
}

impl InitialSpec {
    fn build(&self, width: usize, k: u8, seed: u64) -> Result<Vec<u8>> {
        let mut rng = seeded(seed);
        let cells = match self {
            Self::Single => init::simple(width, 1, 0),
            Self::Random { span: None } => init::random(width, k, &mut rng),
            Self::Random { span: Some(span) } => init::random_span(width, k, *span, &mut rng),
            Self::Cells { cells } => {
                let cells: Vec<u8> = parse_digits(cells, u32::from(k))?
                    .into_iter()
                    .map(|d| d as u8)
                    .collect();
                if cells.len() != width {
                    bail!("{} initial cells given for width {width}", cells.len());
                }
                cells
            }
        };
        Ok(cells)
    }
}

/// Digits of `text` in base `radix`, ignoring whitespace.
fn parse_digits(text: &str, radix: u32) -> Result<Vec<u32>> {
    if !(2..=36).contains(&radix) {
        bail!("cells can only be written as digits for 2 to 36 states, got {radix}");
    }
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            c.to_digit(radix)
                .with_context(|| format!("'{c}' is not a base-{radix} digit"))
        })
        .collect()
}

impl ExperimentSpec {
    pub fn default_name(&self) -> String {
        match self {
            Self::Elementary { rule, .. } => format!("elementary rule {rule}"),
            Self::Totalistic { k, rule, .. } => format!("totalistic k={k} rule {rule}"),
            Self::Reversible { rule, .. } => format!("reversible rule {rule}"),
            Self::Hopfield { patterns, .. } => format!("hopfield ({} patterns)", patterns.len()),
            Self::Turing { table, .. } => format!("turing machine ({} transitions)", table.len()),
            Self::Fungal { rows, cols, .. } => format!("fungal growth {rows}x{cols}"),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Elementary { .. } => "elementary",
            Self::Totalistic { .. } => "totalistic",
            Self::Reversible { .. } => "reversible",
            Self::Hopfield { .. } => "hopfield",
            Self::Turing { .. } => "turing",
            Self::Fungal { .. } => "fungal",
        }
    }
}

impl Experiment {
    pub fn new(model: ExperimentSpec, evolve: EvolveConfig) -> Self {
        Self {
            name: None,
            evolve,
            model,
        }
    }

    /// Read an experiment from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read experiment from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse experiment {}", path.display()))
    }

    pub fn name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.model.default_name())
    }

    pub fn run(&self) -> Result<Outcome> {
        let name = self.name();
        let config = self.evolve.clone();
        let timesteps = config.timesteps;
        info!(
            experiment = %name,
            kind = self.model.kind(),
            timesteps,
            seed = config.seed,
            "experiment_start"
        );

        let outcome = match &self.model {
            ExperimentSpec::Elementary {
                rule,
                width,
                initial,
                boundary,
            } => {
                if *boundary == Boundary::Open {
                    bail!(
                        "elementary rules need a left and right neighbour for every cell; \
                         use a totalistic model for open boundaries"
                    );
                }
                let initial = initial.build(*width, 2, config.seed)?;
                let rule = ElementaryRule::new(*rule);
                let rows = run_cells(initial, ring(*width, 1, *boundary)?, &rule, config)?;
                Outcome::Cells {
                    name,
                    timesteps,
                    rows,
                }
            }
            ExperimentSpec::Totalistic {
                k,
                rule,
                width,
                radius,
                initial,
                boundary,
            } => {
                let initial = initial.build(*width, *k, config.seed)?;
                let rule = TotalisticRule::new(*k, *rule)?;
                let rows = run_cells(initial, ring(*width, *radius, *boundary)?, &rule, config)?;
                Outcome::Cells {
                    name,
                    timesteps,
                    rows,
                }
            }
            ExperimentSpec::Reversible {
                rule,
                width,
                initial,
                past,
            } => {
                let initial = initial.build(*width, 2, config.seed)?;
                let past = match past {
                    Some(spec) => spec.build(*width, 2, config.seed.wrapping_add(1))?,
                    None => initial.clone(),
                };
                let rule = ReversibleRule::new(ElementaryRule::new(*rule), Alphabet::Binary);
                let trajectory =
                    Evolution::new(initial, ring(*width, 1, Boundary::Periodic)?, &rule)
                        .past_conditions(vec![past])
                        .with_config(config)
                        .run()?;
                Outcome::Cells {
                    name,
                    timesteps,
                    rows: rows_of(&trajectory.activities),
                }
            }
            ExperimentSpec::Hopfield {
                patterns,
                probe,
                threshold,
                columns,
            } => {
                let patterns = patterns
                    .iter()
                    .map(|p| bipolar(p))
                    .collect::<Result<Vec<_>>>()?;
                let probe = bipolar(probe)?;
                let mut net = HopfieldNet::new(probe.len()).with_threshold(*threshold);
                net.train(&patterns)?;
                let rule = net.rule();
                let trajectory = Evolution::new(probe, net.topology(), &rule)
                    .update_order(net.update_order())
                    .with_config(config)
                    .run()?;
                let last = trajectory.activities.last();
                let recalled = patterns.iter().position(|p| p.as_slice() == last);
                Outcome::Bipolar {
                    name,
                    timesteps,
                    columns: *columns,
                    rows: rows_of(&trajectory.activities),
                    recalled,
                }
            }
            ExperimentSpec::Turing {
                table,
                tape,
                head,
                state,
            } => {
                let machine =
                    TuringMachine::new(parse_digits(tape, 36)?, table.clone(), *state, *head)?;
                let trajectory =
                    Evolution::new(machine.initial_conditions(), machine.topology()?, &HeadRule)
                        .input_function(&HeadMover)
                        .rule_table(machine.table())
                        .with_config(config)
                        .run()?;
                let rows = trajectory
                    .activities
                    .iter()
                    .map(|(timestep, cells)| Row {
                        timestep,
                        cells: TapeRow::from_cells(cells),
                    })
                    .collect();
                Outcome::Tape {
                    name,
                    timesteps,
                    rows,
                }
            }
            ExperimentSpec::Fungal {
                rows,
                cols,
                initial_resource,
                transfer,
                growth_threshold,
                prune_threshold,
            } => {
                let mut model = FungalGrowth::new(*rows, *cols, *initial_resource)?;
                if let Some(transfer) = transfer {
                    model = model.with_transfer(*transfer);
                }
                if let Some(threshold) = growth_threshold {
                    model = model.with_growth_threshold(*threshold);
                }
                if let Some(threshold) = prune_threshold {
                    model = model.with_prune_threshold(*threshold);
                }
                let flow = model.activity_rule();
                let growth = model.connectivity_rule();
                let trajectory =
                    Evolution::new(model.initial_conditions(), model.topology(), &flow)
                        .connectivity_rule(&growth)
                        .with_config(config)
                        .run()?;
                let frames = trajectory
                    .activities
                    .iter()
                    .map(|(timestep, resource)| NetworkFrame {
                        timestep,
                        total_resource: resource.iter().sum(),
                        edges: trajectory
                            .connectivities
                            .get(timestep)
                            .map(|topology| topology.edge_count()),
                    })
                    .collect();
                Outcome::Network {
                    name,
                    timesteps,
                    frames,
                }
            }
        };

        info!(experiment = %outcome.name(), "experiment_complete");
        Ok(outcome)
    }
}

fn run_cells<R: ActivityRule<u8>>(
    initial: Vec<u8>,
    topology: netomata_core::Topology,
    rule: &R,
    config: EvolveConfig,
) -> Result<Vec<Row<Vec<u8>>>> {
    let trajectory = Evolution::new(initial, topology, rule)
        .with_config(config)
        .run()?;
    Ok(rows_of(&trajectory.activities))
}

fn rows_of<A: Clone>(history: &ActivityHistory<A>) -> Vec<Row<Vec<A>>> {
    history
        .iter()
        .map(|(timestep, cells)| Row {
            timestep,
            cells: cells.to_vec(),
        })
        .collect()
}

fn bipolar(bits: &str) -> Result<Vec<i8>> {
    let bits: Vec<u8> = parse_digits(bits, 2)?.into_iter().map(|b| b as u8).collect();
    Ok(init::to_bipolar(&bits))
}
