use crate::patterns::PatternCategory;
use crate::sanitizer::{ValidationStage, BYPASS_HINT};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevctlError {
    #[error(
        "{stage} validation failed: {category} `{fragment}` detected in \"{input}\"\n{hint}",
        hint = BYPASS_HINT
    )]
    Validation {
        stage: ValidationStage,
        category: PatternCategory,
        fragment: String,
        input: String,
    },

    #[error("duplicate command: '{0}' is already registered")]
    DuplicateCommand(String),

    #[error("duplicate alias: '{alias}' already resolves to '{existing}'")]
    DuplicateAlias { alias: String, existing: String },

    #[error("failed to parse {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("command '{command}' exited with status {code}")]
    Execution { command: String, code: i32 },

    #[error("unbound placeholder {placeholder}: only {supplied} argument(s) supplied")]
    UnboundPlaceholder { placeholder: String, supplied: usize },

    #[error("unknown command: {0}")]
    CommandNotFound(String),

    #[error("'{0}' is a built-in command and cannot be run as a custom command")]
    BuiltinNotRunnable(String),

    #[error("failed to spawn shell for '{command}': {message}")]
    SpawnFailed { command: String, message: String },

    #[error("home directory not found: set HOME or DEVCTL_HOME")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl DevctlError {
    /// The stage and category of a validation failure, if this is one.
    pub fn validation(&self) -> Option<(ValidationStage, PatternCategory)> {
        match self {
            DevctlError::Validation {
                stage, category, ..
            } => Some((*stage, *category)),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DevctlError>;
