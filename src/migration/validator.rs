use crate::plan::{ensure_unique_modules, PlanRecord};
use crate::registry::{PublishingMode, RegistryClient, RegistryError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::Result;

pub const MODULE_NOT_FOUND: &str = "module not found";
pub const DESTINATION_VCS_NOT_FOUND: &str = "destination VCS connection not found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "classification", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Eligible,
    Skipped(String),
    Failed(String),
}

impl Classification {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Classification::Eligible)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Classification::Eligible => None,
            Classification::Skipped(reason) | Classification::Failed(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedRecord {
    pub record: PlanRecord,
    pub classification: Classification,
}

/// Validator output, in plan order. This is also the dry-run preview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub records: Vec<ValidatedRecord>,
}

impl ValidationReport {
    pub fn eligible(&self) -> impl Iterator<Item = &ValidatedRecord> {
        self.records.iter().filter(|r| r.classification.is_eligible())
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible().count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read-only checks of plan records against the current registry state.
pub struct PlanValidator {
    client: Arc<dyn RegistryClient>,
}

impl PlanValidator {
    pub fn new(client: Arc<dyn RegistryClient>) -> Self {
        Self { client }
    }

    /// Classify every record. Fails only when the plan itself is ill-formed.
    pub async fn validate(&self, plan: &[PlanRecord]) -> Result<ValidationReport> {
        ensure_unique_modules(plan)?;

        let mut records = Vec::with_capacity(plan.len());
        for record in plan {
            let classification = self.classify(record).await;
            match &classification {
                Classification::Eligible => info!("{} eligible for migration", record.module_key()),
                Classification::Skipped(reason) => {
                    warn!("{} will be skipped: {}", record.module_key(), reason)
                }
                Classification::Failed(reason) => {
                    warn!("{} failed validation: {}", record.module_key(), reason)
                }
            }
            records.push(ValidatedRecord {
                record: record.clone(),
                classification,
            });
        }

        Ok(ValidationReport { records })
    }

    async fn classify(&self, record: &PlanRecord) -> Classification {
        let entry = match self.client.get_module(&record.module_key()).await {
            Ok(entry) => entry,
            Err(RegistryError::NotFound { .. }) => {
                return Classification::Skipped(MODULE_NOT_FOUND.to_string())
            }
            Err(e) => return Classification::Failed(e.to_string()),
        };

        if entry.publishing_mode != PublishingMode::Tag {
            return Classification::Skipped(format!(
                "unsupported publishing mode: {}",
                entry.publishing_mode
            ));
        }

        match self
            .client
            .get_vcs_connection(&record.dst_vcs_identifier)
            .await
        {
            Ok(_) => Classification::Eligible,
            Err(RegistryError::NotFound { .. }) => {
                Classification::Failed(DESTINATION_VCS_NOT_FOUND.to_string())
            }
            Err(e) => Classification::Failed(e.to_string()),
        }
    }
}
