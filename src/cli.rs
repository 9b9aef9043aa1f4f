use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{Error, Result};
use crate::report::FormatSelection;

/// scorecard: render candidate evaluation reports from model analyses
#[derive(Parser, Debug, Clone)]
#[command(name = "scorecard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Path to config file (default: scorecard.toml if present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Report format to write
    #[arg(long, value_enum, global = true)]
    pub format: Option<FormatSelection>,

    /// Directory reports are written to
    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    /// Directory with template overrides (report.md, consensus.html, ...)
    #[arg(long, global = true)]
    pub template_dir: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Render the report for a single provider analysis
    Render {
        /// Analysis JSON produced by one provider
        analysis: PathBuf,

        /// Output file name without extension
        #[arg(long)]
        output: Option<String>,
    },

    /// Render a consensus report across several provider analyses
    Consensus {
        /// Provider analyses as KEY=PATH, or PATH to use the file stem as key
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file name without extension
        #[arg(long)]
        output: Option<String>,
    },

    /// Group feedback items into themes and print the merged paragraphs
    Themes {
        /// Feedback items; read from stdin (one per line) when omitted
        items: Vec<String>,
    },
}

/// A `consensus` input: provider key and analysis path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInput {
    pub key: String,
    pub path: PathBuf,
}

/// Parse `KEY=PATH`, or a bare `PATH` keyed by its file stem.
pub fn parse_provider_input(raw: &str) -> Result<ProviderInput> {
    if let Some((key, path)) = raw.split_once('=') {
        let (key, path) = (key.trim(), path.trim());
        if key.is_empty() || path.is_empty() {
            return Err(Error::Cli(format!(
                "expected KEY=PATH or PATH, got \"{raw}\""
            )));
        }
        return Ok(ProviderInput {
            key: key.to_string(),
            path: PathBuf::from(path),
        });
    }

    let path = PathBuf::from(raw);
    let key = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Cli(format!("cannot derive provider key from \"{raw}\"")))?
        .to_string();
    Ok(ProviderInput { key, path })
}
