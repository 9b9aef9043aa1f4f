use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("analysis shape error: {0}")]
    AnalysisShape(String),

    #[error("template error: {0}")]
    Template(#[from] upon::Error),

    #[error("invalid argument: {0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
