use super::error::{PlanError, Result};
use super::record::PlanRecord;
use crate::registry::{ModuleRegistryEntry, PublishingMode, RegistryClient, VcsKind};
use tracing::info;

/// Derives a migration plan from the modules currently in the registry.
///
/// A module is selected when it is VCS-backed, sourced from `src_vcs`, and its
/// repository lives under `src_namespace`. Its destination repository keeps the
/// repository name and moves to `dst_namespace`.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    src_namespace: String,
    dst_namespace: String,
    src_vcs: String,
    dst_vcs: String,
}

impl PlanBuilder {
    pub fn new(
        src_namespace: &str,
        dst_namespace: &str,
        src_vcs: &str,
        dst_vcs: &str,
    ) -> Result<Self> {
        for (field, value) in [("source VCS", src_vcs), ("destination VCS", dst_vcs)] {
            if VcsKind::detect(value).is_none() {
                return Err(PlanError::InvalidIdentifier {
                    field: format!("{field} connection identifier"),
                    value: value.to_string(),
                    reason: "expected an 'ot-*' or 'ghain-*' identifier".to_string(),
                });
            }
        }
        for (field, value) in [
            ("source namespace", src_namespace),
            ("destination namespace", dst_namespace),
        ] {
            if value.is_empty() || value.contains('/') {
                return Err(PlanError::InvalidIdentifier {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "expected a single VCS organization name".to_string(),
                });
            }
        }

        Ok(Self {
            src_namespace: src_namespace.to_string(),
            dst_namespace: dst_namespace.to_string(),
            src_vcs: src_vcs.to_string(),
            dst_vcs: dst_vcs.to_string(),
        })
    }

    /// Query the registry for all private modules and select those to migrate.
    pub async fn build(&self, client: &dyn RegistryClient) -> Result<Vec<PlanRecord>> {
        info!("Querying the registry for all private modules");
        let modules = client.list_modules().await?;
        info!("Found {} private registry modules", modules.len());

        let plan = self.select(&modules);
        info!("{} modules match the migration criteria", plan.len());
        Ok(plan)
    }

    pub fn select(&self, modules: &[ModuleRegistryEntry]) -> Vec<PlanRecord> {
        modules
            .iter()
            .filter_map(|module| match self.exclusion_reason(module) {
                Some(reason) => {
                    info!("'{}' excluded: {}", module.key, reason);
                    None
                }
                None => Some(self.record_for(module)),
            })
            .collect()
    }

    fn exclusion_reason(&self, module: &ModuleRegistryEntry) -> Option<&'static str> {
        if module.publishing_mode == PublishingMode::NoCode {
            return Some("no-code module");
        }
        let (Some(vcs), Some(repo)) = (&module.vcs_identifier, &module.repo_identifier) else {
            return Some("not a VCS module");
        };
        if vcs != &self.src_vcs {
            return Some("does not match source VCS connection for migration");
        }
        if module.display_identifier.as_deref().is_some_and(|d| d != repo) {
            return Some("repository identifier differs from its display identifier");
        }
        match module.repo_namespace() {
            None => Some("repository identifier is not in ':org/:repo' form"),
            Some(namespace) if namespace != self.src_namespace => {
                Some("does not match source namespace for migration")
            }
            Some(_) => None,
        }
    }

    fn record_for(&self, module: &ModuleRegistryEntry) -> PlanRecord {
        let src_repo = module.repo_identifier.clone().unwrap_or_default();
        let repo_name = src_repo.split_once('/').map(|(_, name)| name).unwrap_or_default();

        PlanRecord {
            module_namespace: module.key.namespace.clone(),
            module_name: module.key.name.clone(),
            module_provider: module.key.provider.clone(),
            src_vcs_identifier: self.src_vcs.clone(),
            dst_vcs_identifier: self.dst_vcs.clone(),
            dst_repo_identifier: format!("{}/{}", self.dst_namespace, repo_name),
            src_repo_identifier: src_repo,
        }
    }
}
