use std::process::ExitStatus;

use thiserror::Error;

use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum MemoError {
    /// The interactive title prompt hit end of input.
    #[error("canceled")]
    Canceled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("command `{command}` failed: {status}")]
    Command { command: String, status: ExitStatus },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("cannot determine config directory; set MEMO_CONFIG_DIR")]
    NoConfigDir,

    #[error("No files selected")]
    NoSelection,

    #[error("pattern required")]
    PatternRequired,

    #[error("'{0}' is not a memo command. see 'memo help'")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, MemoError>;
