use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::report::FormatSelection;
use crate::themes::{ThemeConfig, ThemeTable};

/// Config file read when `--config` is not given. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "scorecard.toml";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub format: Option<FormatSelection>,
    pub output_dir: Option<String>,
    pub template_dir: Option<String>,
    #[serde(default)]
    pub themes: Vec<ThemeConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub format: FormatSelection,
    pub output_dir: PathBuf,
    pub template_dir: Option<PathBuf>,
    pub themes: ThemeTable,
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match cli.config.as_deref() {
            Some(path) => {
                let path = Path::new(path);
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(path)?)?
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    parse_config(&std::fs::read_to_string(path)?)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        merge(file_config, cli)
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(ref dir) = config.output_dir
        && dir.trim().is_empty()
    {
        return Err(Error::ConfigValidation(
            "output_dir must not be empty".to_string(),
        ));
    }
    if let Some(ref dir) = config.template_dir
        && dir.trim().is_empty()
    {
        return Err(Error::ConfigValidation(
            "template_dir must not be empty".to_string(),
        ));
    }
    // Theme entries are checked when the table is built.
    ThemeTable::from_config(&config.themes)?;
    Ok(())
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Result<Config> {
    Ok(Config {
        format: cli.format.or(file.format).unwrap_or_default(),
        output_dir: cli
            .output_dir
            .clone()
            .or(file.output_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        template_dir: cli
            .template_dir
            .clone()
            .or(file.template_dir)
            .map(PathBuf::from),
        themes: ThemeTable::from_config(&file.themes)?,
    })
}
