//! Config command implementation.

use anyhow::Result;

use crate::config::{Config, OUTPUT_FORMAT_VAR, SEED_VAR, TIMESTEPS_VAR};

/// Show the effective configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("Netomata CLI Configuration");
    println!("{:-<40}", "");
    println!(
        "Seed:              {}",
        config
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "(per experiment)".to_string())
    );
    println!("Output Format:     {}", config.output_format);
    println!("Default Timesteps: {}", config.default_timesteps);

    println!();
    println!("Environment: {SEED_VAR}, {OUTPUT_FORMAT_VAR}, {TIMESTEPS_VAR}");
    match Config::config_file_path() {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (no config directory available)"),
    }
    Ok(())
}

/// Print the path of the config file.
pub fn path() -> Result<()> {
    match Config::config_file_path() {
        Some(path) => println!("{}", path.display()),
        None => println!("(no config file path available)"),
    }
    Ok(())
}
