use std::path::PathBuf;
use thiserror::Error;

/// Comprehensive error enum for the restore service using thiserror
#[derive(Error, Debug)]
pub enum RestoreServiceError {
    // CLI pre-flight failures
    #[error("Invalid output path: {0}")]
    ArgumentValidation(String),

    // Mount/unmount of the temporary NFS scan mount
    #[error("Mount operation failed: {0}")]
    Mount(String),

    // A malformed backup descriptor aborts the whole catalog scan
    #[error("Backup descriptor {path} is invalid: {reason}")]
    CatalogParse { path: PathBuf, reason: String },

    #[error("Restore command failed: {0}")]
    RestoreCommand(String),

    #[error("Command not found or execution error: {0}")]
    CommandNotFound(String),

    // Automatic conversions from standard library and ecosystem errors
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    DialogueError(#[from] dialoguer::Error),

    #[error(transparent)]
    TemplateError(#[from] indicatif::style::TemplateError),
}

impl RestoreServiceError {
    /// Build a catalog parse error carrying the offending descriptor path
    pub fn catalog_parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        RestoreServiceError::CatalogParse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
