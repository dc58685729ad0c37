use super::error::{PlanError, Result};
use crate::registry::ModuleKey;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static VCS_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(ot|ghain)-[A-Za-z0-9_-]+$").expect("valid regex"));
static REPO_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/\s]+/[^/\s]+$").expect("valid regex"));
static MODULE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("valid regex"));

/// One requested migration of a module's VCS source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanRecord {
    pub module_namespace: String,
    pub module_name: String,
    pub module_provider: String,
    #[serde(rename = "src_vcs")]
    pub src_vcs_identifier: String,
    #[serde(rename = "dst_vcs")]
    pub dst_vcs_identifier: String,
    #[serde(rename = "src_repo")]
    pub src_repo_identifier: String,
    #[serde(rename = "dst_repo")]
    pub dst_repo_identifier: String,
}

impl PlanRecord {
    pub fn module_key(&self) -> ModuleKey {
        ModuleKey::new(
            &self.module_namespace,
            &self.module_name,
            &self.module_provider,
        )
    }

    /// Check every field is present and well-formed.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("module_namespace", &self.module_namespace),
            ("module_name", &self.module_name),
            ("module_provider", &self.module_provider),
        ] {
            check(field, value, &MODULE_SEGMENT, "expected letters, digits, '-', '_' or '.'")?;
        }
        for (field, value) in [
            ("src_vcs", &self.src_vcs_identifier),
            ("dst_vcs", &self.dst_vcs_identifier),
        ] {
            check(field, value, &VCS_IDENTIFIER, "expected an 'ot-*' or 'ghain-*' identifier")?;
        }
        for (field, value) in [
            ("src_repo", &self.src_repo_identifier),
            ("dst_repo", &self.dst_repo_identifier),
        ] {
            check(field, value, &REPO_IDENTIFIER, "expected ':org/:repo'")?;
        }
        Ok(())
    }
}

fn check(field: &str, value: &str, pattern: &Regex, reason: &str) -> Result<()> {
    if pattern.is_match(value) {
        return Ok(());
    }
    Err(PlanError::InvalidIdentifier {
        field: field.to_string(),
        value: value.to_string(),
        reason: if value.is_empty() {
            "value is empty".to_string()
        } else {
            reason.to_string()
        },
    })
}

/// Reject plans that name the same module twice; the target state would be ambiguous.
pub fn ensure_unique_modules(records: &[PlanRecord]) -> Result<()> {
    let mut seen: HashMap<ModuleKey, usize> = HashMap::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if let Some(first) = seen.insert(record.module_key(), index) {
            return Err(PlanError::DuplicateModule {
                module: record.module_key().to_string(),
                first: first + 1,
                second: index + 1,
            });
        }
    }
    Ok(())
}
