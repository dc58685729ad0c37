use crate::plan::PlanRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Success,
    Skipped,
    Failed,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeStatus::Success => "SUCCESS",
            OutcomeStatus::Skipped => "SKIPPED",
            OutcomeStatus::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// Final result for one plan record. Only the executor creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOutcome {
    record: PlanRecord,
    status: OutcomeStatus,
    reason: Option<String>,
}

impl MigrationOutcome {
    pub(crate) fn success(record: PlanRecord) -> Self {
        Self {
            record,
            status: OutcomeStatus::Success,
            reason: None,
        }
    }

    pub(crate) fn skipped(record: PlanRecord, reason: impl Into<String>) -> Self {
        Self {
            record,
            status: OutcomeStatus::Skipped,
            reason: Some(reason.into()),
        }
    }

    pub(crate) fn failed(record: PlanRecord, reason: impl Into<String>) -> Self {
        Self {
            record,
            status: OutcomeStatus::Failed,
            reason: Some(reason.into()),
        }
    }

    pub fn record(&self) -> &PlanRecord {
        &self.record
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

/// Outcomes of one run, in plan order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Set when the run stopped early; records without an outcome never started.
    pub cancelled: bool,
    /// Number of records in the plan, including any that never started.
    pub planned: usize,
    outcomes: Vec<MigrationOutcome>,
}

impl RunReport {
    pub(crate) fn new(planned: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            cancelled: false,
            planned,
            outcomes: Vec::with_capacity(planned),
        }
    }

    pub(crate) fn push(&mut self, outcome: MigrationOutcome) {
        self.outcomes.push(outcome);
    }

    pub(crate) fn finish(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
        self.finished_at = Some(Utc::now());
    }

    pub fn outcomes(&self) -> &[MigrationOutcome] {
        &self.outcomes
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            success: self.count(OutcomeStatus::Success),
            skipped: self.count(OutcomeStatus::Skipped),
            failed: self.count(OutcomeStatus::Failed),
        }
    }

    pub fn not_started(&self) -> usize {
        self.planned.saturating_sub(self.outcomes.len())
    }

    /// Outcomes that need the operator's attention.
    pub fn unsuccessful(&self) -> Vec<&MigrationOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != OutcomeStatus::Success)
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.status == OutcomeStatus::Failed)
    }
}
