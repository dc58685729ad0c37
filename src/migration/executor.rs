use super::cancel::CancellationFlag;
use super::report::{MigrationOutcome, RunReport};
use super::retry::{retry_registry_call, RetryPolicy};
use super::validator::{Classification, ValidatedRecord, ValidationReport, MODULE_NOT_FOUND};
use crate::plan::PlanRecord;
use crate::registry::{PublishingMode, RegistryClient, RegistryError};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

pub const SOURCE_ALREADY_CHANGED: &str = "source already changed";
pub const VERIFICATION_MISMATCH: &str = "post-update verification mismatch";
/// Prefix of the reason when the post-update re-read itself fails.
pub const VERIFICATION_FAILED: &str = "post-update verification failed";
pub const TRANSIENT_EXHAUSTED: &str = "transient error after retries";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    pub retry: RetryPolicy,
    /// Records processed at the same time. 1 means strictly sequential.
    pub parallelism: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            parallelism: 1,
        }
    }
}

/// Applies validated plan records to the registry, one outcome per record.
pub struct MigrationExecutor {
    client: Arc<dyn RegistryClient>,
    config: ExecutorConfig,
    cancellation: CancellationFlag,
}

impl MigrationExecutor {
    pub fn new(client: Arc<dyn RegistryClient>, config: ExecutorConfig) -> Self {
        Self {
            client,
            config,
            cancellation: CancellationFlag::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Process every validated record. Per-record failures are reported, never raised.
    pub async fn execute(&self, validated: &ValidationReport) -> RunReport {
        let start_time = Instant::now();
        let mut report = RunReport::new(validated.len());
        let parallelism = self.config.parallelism.max(1);

        info!(
            "Starting migration of {} records ({} eligible, parallelism {})",
            validated.len(),
            validated.eligible_count(),
            parallelism
        );

        // `buffered` yields in input order whatever order the records finish in.
        let mut outcomes = stream::iter(validated.records.iter())
            .map(|record| self.process(record))
            .buffered(parallelism);

        while let Some(outcome) = outcomes.next().await {
            if let Some(outcome) = outcome {
                report.push(outcome);
            }
        }

        let cancelled = self.cancellation.is_cancelled() && report.not_started() > 0;
        if cancelled {
            warn!(
                "Migration cancelled; {} records were not started",
                report.not_started()
            );
        }
        report.finish(cancelled);

        let counts = report.counts();
        info!(
            "Migration finished in {:?}: {} succeeded, {} skipped, {} failed",
            start_time.elapsed(),
            counts.success,
            counts.skipped,
            counts.failed
        );

        report
    }

    /// `None` when cancellation was requested before this record began.
    async fn process(&self, validated: &ValidatedRecord) -> Option<MigrationOutcome> {
        if self.cancellation.is_cancelled() {
            return None;
        }

        let record = validated.record.clone();
        let outcome = match &validated.classification {
            Classification::Eligible => self.migrate(record).await,
            Classification::Skipped(reason) => MigrationOutcome::skipped(record, reason.clone()),
            Classification::Failed(reason) => MigrationOutcome::failed(record, reason.clone()),
        };
        Some(outcome)
    }

    async fn migrate(&self, record: PlanRecord) -> MigrationOutcome {
        let key = record.module_key();

        let current = match self.client.get_module(&key).await {
            Ok(entry) => entry,
            Err(RegistryError::NotFound { .. }) => {
                warn!("{} disappeared before migration", key);
                return MigrationOutcome::skipped(record, MODULE_NOT_FOUND);
            }
            Err(e) => {
                error!("Failed to re-read {}: {}", key, e);
                return MigrationOutcome::failed(record, e.to_string());
            }
        };

        if !current.is_sourced_from(&record.src_vcs_identifier, &record.src_repo_identifier) {
            info!(
                "{} skipped: now sourced from {:?} {:?}",
                key, current.vcs_identifier, current.repo_identifier
            );
            return MigrationOutcome::skipped(record, SOURCE_ALREADY_CHANGED);
        }
        if current.publishing_mode != PublishingMode::Tag {
            return MigrationOutcome::skipped(
                record,
                format!("unsupported publishing mode: {}", current.publishing_mode),
            );
        }

        info!(
            "Repointing {} to {} {}",
            key, record.dst_vcs_identifier, record.dst_repo_identifier
        );
        let what = format!("Updating VCS source of {key}");
        let patched = retry_registry_call(&self.config.retry, &what, || {
            self.client.set_module_vcs_source(
                &key,
                &record.dst_vcs_identifier,
                &record.dst_repo_identifier,
            )
        })
        .await;

        match patched {
            Ok((_, attempts)) if attempts > 1 => {
                info!("{} updated after {} attempts", key, attempts)
            }
            Ok(_) => {}
            Err(failure) if failure.exhausted => {
                error!(
                    "{} failed after {} attempts: {}",
                    key, failure.attempts, failure.error
                );
                return MigrationOutcome::failed(record, TRANSIENT_EXHAUSTED);
            }
            Err(failure) => {
                error!("{} update rejected: {}", key, failure.error);
                return MigrationOutcome::failed(record, failure.error.to_string());
            }
        }

        match self.client.get_module(&key).await {
            Ok(entry)
                if entry
                    .is_sourced_from(&record.dst_vcs_identifier, &record.dst_repo_identifier) =>
            {
                info!("{} migrated", key);
                MigrationOutcome::success(record)
            }
            Ok(entry) => {
                error!(
                    "{} verification mismatch: registry reports {:?} {:?}",
                    key, entry.vcs_identifier, entry.repo_identifier
                );
                MigrationOutcome::failed(record, VERIFICATION_MISMATCH)
            }
            Err(e) => {
                error!("{} could not be verified: {}", key, e);
                MigrationOutcome::failed(record, format!("{VERIFICATION_FAILED}: {e}"))
            }
        }
    }
}
