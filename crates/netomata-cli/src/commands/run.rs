//! Run command implementation.

use anyhow::Result;
use tracing::debug;

use crate::config::Config;
use crate::experiment::Experiment;
use crate::output::OutputFormat;

/// Run `experiment` and print the outcome in the configured format.
pub fn execute(config: &Config, mut experiment: Experiment) -> Result<()> {
    if let Some(seed) = config.seed {
        debug!(seed, "seed_override");
        experiment.evolve.seed = seed;
    }
    let outcome = experiment.run()?;
    print!("{}", outcome.render(config.output_format)?);
    if config.output_format == OutputFormat::Json {
        println!();
    }
    Ok(())
}
