use super::cancel::CancellationFlag;
use super::error::Result;
use super::executor::{ExecutorConfig, MigrationExecutor};
use super::report::RunReport;
use super::validator::{PlanValidator, ValidationReport};
use crate::plan::PlanRecord;
use crate::registry::RegistryClient;
use std::sync::Arc;

/// Entry point for callers: preview a plan, then run it.
pub struct MigrationEngine {
    validator: PlanValidator,
    executor: MigrationExecutor,
}

impl MigrationEngine {
    pub fn new(client: Arc<dyn RegistryClient>, config: ExecutorConfig) -> Self {
        Self {
            validator: PlanValidator::new(client.clone()),
            executor: MigrationExecutor::new(client, config),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.executor = self.executor.with_cancellation(cancellation);
        self
    }

    /// Validate without mutating anything.
    pub async fn preview(&self, plan: &[PlanRecord]) -> Result<ValidationReport> {
        self.validator.validate(plan).await
    }

    /// Execute a preview the operator has confirmed.
    pub async fn execute(&self, preview: &ValidationReport) -> RunReport {
        self.executor.execute(preview).await
    }

    /// Validate and execute in one step.
    pub async fn run(&self, plan: &[PlanRecord]) -> Result<RunReport> {
        let preview = self.preview(plan).await?;
        Ok(self.execute(&preview).await)
    }
}
