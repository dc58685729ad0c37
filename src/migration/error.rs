use crate::plan::PlanError;
use thiserror::Error;

/// Whole-run failures. Per-record problems are outcomes, not errors.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Invalid migration plan: {0}")]
    InvalidPlan(#[from] PlanError),
}

pub type Result<T> = std::result::Result<T, MigrationError>;
