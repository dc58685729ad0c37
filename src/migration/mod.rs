pub mod cancel;
pub mod engine;
pub mod error;
pub mod executor;
pub mod report;
pub mod retry;
pub mod validator;

pub use cancel::CancellationFlag;
pub use engine::MigrationEngine;
pub use error::{MigrationError, Result};
pub use executor::{
    ExecutorConfig, MigrationExecutor, SOURCE_ALREADY_CHANGED, TRANSIENT_EXHAUSTED,
    VERIFICATION_FAILED, VERIFICATION_MISMATCH,
};
pub use report::{MigrationOutcome, OutcomeStatus, RunReport, StatusCounts};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use validator::{Classification, PlanValidator, ValidatedRecord, ValidationReport};
