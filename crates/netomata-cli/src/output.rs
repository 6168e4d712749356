//! Experiment results and how they are printed.

use std::fmt::{self, Write};

use anyhow::Result;
use netomata_automaton::models::TapeRow;
use serde::{Deserialize, Serialize};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unknown format: {}. Use 'text' or 'json'", s),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// One retained timestep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row<T> {
    pub timestep: usize,
    pub cells: T,
}

/// Resource and link count of a growing network at one timestep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkFrame {
    pub timestep: usize,
    pub total_resource: f64,
    /// `None` when the snapshot for this timestep was not kept.
    pub edges: Option<usize>,
}

/// What an experiment produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Cells {
        name: String,
        timesteps: usize,
        rows: Vec<Row<Vec<u8>>>,
    },
    Bipolar {
        name: String,
        timesteps: usize,
        columns: usize,
        rows: Vec<Row<Vec<i8>>>,
        /// Index of the stored pattern the final state equals, if any.
        recalled: Option<usize>,
    },
    Tape {
        name: String,
        timesteps: usize,
        rows: Vec<Row<TapeRow>>,
    },
    Network {
        name: String,
        timesteps: usize,
        frames: Vec<NetworkFrame>,
    },
}

impl Outcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Cells { name, .. }
            | Self::Bipolar { name, .. }
            | Self::Tape { name, .. }
            | Self::Network { name, .. } => name,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => Ok(self.to_text()?),
        }
    }

    fn to_text(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        match self {
            Self::Cells {
                name,
                timesteps,
                rows,
            } => {
                writeln!(out, "{name} ({timesteps} timesteps)")?;
                for row in rows {
                    let line: String = row.cells.iter().map(|c| symbol(u32::from(*c))).collect();
                    writeln!(out, "{:>5} {line}", row.timestep)?;
                }
            }
            Self::Bipolar {
                name,
                timesteps,
                columns,
                rows,
                recalled,
            } => {
                writeln!(out, "{name} ({timesteps} timesteps)")?;
                if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
                    for (label, row) in [("start", first), ("final", last)] {
                        writeln!(out, "{label} (t={})", row.timestep)?;
                        for chunk in row.cells.chunks((*columns).max(1)) {
                            let line: String = chunk
                                .iter()
                                .map(|c| if *c > 0 { '#' } else { '.' })
                                .collect();
                            writeln!(out, "  {line}")?;
                        }
                    }
                }
                match recalled {
                    Some(index) => writeln!(out, "recalled pattern {index}")?,
                    None => writeln!(out, "no stored pattern recalled")?,
                }
            }
            Self::Tape {
                name,
                timesteps,
                rows,
            } => {
                writeln!(out, "{name} ({timesteps} timesteps)")?;
                for row in rows {
                    let line: String = row.cells.symbols.iter().map(|s| symbol(*s)).collect();
                    match row.cells.head {
                        Some((position, state)) => writeln!(
                            out,
                            "{:>5} {line}  head {position} state {state}",
                            row.timestep
                        )?,
                        None => writeln!(out, "{:>5} {line}", row.timestep)?,
                    }
                }
            }
            Self::Network {
                name,
                timesteps,
                frames,
            } => {
                writeln!(out, "{name} ({timesteps} timesteps)")?;
                writeln!(out, "{:>5} {:>14} {:>6}", "t", "resource", "edges")?;
                for frame in frames {
                    let edges = frame
                        .edges
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    writeln!(
                        out,
                        "{:>5} {:>14.3} {:>6}",
                        frame.timestep, frame.total_resource, edges
                    )?;
                }
            }
        }
        Ok(out)
    }
}

/// A state as one character: `0-9`, then `a-z`.
fn symbol(state: u32) -> char {
    char::from_digit(state, 36).unwrap_or('?')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_cells_render_as_digit_rows() {
        let outcome = Outcome::Cells {
            name: "rule_90".into(),
            timesteps: 1,
            rows: vec![
                Row {
                    timestep: 0,
                    cells: vec![0, 1, 0],
                },
                Row {
                    timestep: 1,
                    cells: vec![1, 0, 1],
                },
            ],
        };
        let text = outcome.render(OutputFormat::Text).unwrap();
        assert_eq!(text, "rule_90 (1 timesteps)\n    0 010\n    1 101\n");

        let json: serde_json::Value =
            serde_json::from_str(&outcome.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["kind"], "cells");
        assert_eq!(json["rows"][1]["cells"], serde_json::json!([1, 0, 1]));
    }

    #[test]
    fn test_tape_rows_show_the_head() {
        let outcome = Outcome::Tape {
            name: "turing".into(),
            timesteps: 0,
            rows: vec![Row {
                timestep: 0,
                cells: TapeRow {
                    symbols: vec![0, 1, 0],
                    head: Some((1, 2)),
                },
            }],
        };
        let text = outcome.render(OutputFormat::Text).unwrap();
        assert!(text.contains("    0 010  head 1 state 2"));
    }
}
