use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Module {module} appears more than once in the plan (rows {first} and {second})")]
    DuplicateModule {
        module: String,
        first: usize,
        second: usize,
    },

    #[error("Malformed plan row {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("Invalid {field} '{value}': {reason}")]
    InvalidIdentifier {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Plan file '{}' already exists", path.display())]
    PlanFileExists { path: PathBuf },

    #[error("Registry error while building plan: {0}")]
    Registry(#[from] crate::registry::RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
