//! In-memory registry used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use terraform_module_migration::migration::{CancellationFlag, ExecutorConfig, RetryPolicy};
use terraform_module_migration::plan::PlanRecord;
use terraform_module_migration::registry::{
    ModuleKey, ModuleRegistryEntry, PublishingMode, RegistryClient, RegistryError, Result,
    VcsConnectionInfo, VcsKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchCall {
    pub key: ModuleKey,
    pub vcs: String,
    pub repo: String,
}

#[derive(Default)]
pub struct FakeRegistry {
    modules: Mutex<HashMap<ModuleKey, ModuleRegistryEntry>>,
    connections: Mutex<HashSet<String>>,
    get_errors: Mutex<HashMap<ModuleKey, RegistryError>>,
    scripted_patch_errors: Mutex<HashMap<ModuleKey, VecDeque<RegistryError>>>,
    failing_patches: Mutex<HashMap<ModuleKey, RegistryError>>,
    /// Patches to these modules report success but are never applied.
    lost_patches: Mutex<HashSet<ModuleKey>>,
    /// Reads of these modules fail once they have been patched.
    failing_reads_after_patch: Mutex<HashMap<ModuleKey, RegistryError>>,
    /// Cancelled while the patch of the keyed module is in flight.
    cancel_on_patch: Mutex<HashMap<ModuleKey, CancellationFlag>>,
    patches: Mutex<Vec<PatchCall>>,
    get_calls: AtomicUsize,
    connection_calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_module(self: &Arc<Self>, entry: ModuleRegistryEntry) -> Arc<Self> {
        self.modules
            .lock()
            .unwrap()
            .insert(entry.key.clone(), entry);
        self.clone()
    }

    pub fn with_connection(self: &Arc<Self>, identifier: &str) -> Arc<Self> {
        self.connections
            .lock()
            .unwrap()
            .insert(identifier.to_string());
        self.clone()
    }

    pub fn fail_get(&self, key: &ModuleKey, error: RegistryError) {
        self.get_errors.lock().unwrap().insert(key.clone(), error);
    }

    /// Every patch of `key` fails with `error`.
    pub fn fail_patches(&self, key: &ModuleKey, error: RegistryError) {
        self.failing_patches
            .lock()
            .unwrap()
            .insert(key.clone(), error);
    }

    /// The next patches of `key` fail with these errors, in order.
    pub fn script_patch_errors(&self, key: &ModuleKey, errors: Vec<RegistryError>) {
        self.scripted_patch_errors
            .lock()
            .unwrap()
            .insert(key.clone(), errors.into());
    }

    pub fn lose_patches(&self, key: &ModuleKey) {
        self.lost_patches.lock().unwrap().insert(key.clone());
    }

    pub fn fail_reads_after_patch(&self, key: &ModuleKey, error: RegistryError) {
        self.failing_reads_after_patch
            .lock()
            .unwrap()
            .insert(key.clone(), error);
    }

    pub fn cancel_during_patch(&self, key: &ModuleKey, cancellation: CancellationFlag) {
        self.cancel_on_patch
            .lock()
            .unwrap()
            .insert(key.clone(), cancellation);
    }

    pub fn set_source(&self, key: &ModuleKey, vcs: &str, repo: &str) {
        if let Some(entry) = self.modules.lock().unwrap().get_mut(key) {
            entry.vcs_identifier = Some(vcs.to_string());
            entry.repo_identifier = Some(repo.to_string());
            entry.display_identifier = Some(repo.to_string());
        }
    }

    pub fn module(&self, key: &ModuleKey) -> Option<ModuleRegistryEntry> {
        self.modules.lock().unwrap().get(key).cloned()
    }

    pub fn patches(&self) -> Vec<PatchCall> {
        self.patches.lock().unwrap().clone()
    }

    pub fn patch_count(&self) -> usize {
        self.patches.lock().unwrap().len()
    }

    pub fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn connection_lookups(&self) -> usize {
        self.connection_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn get_module(&self, key: &ModuleKey) -> Result<ModuleRegistryEntry> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.get_errors.lock().unwrap().get(key) {
            return Err(error.clone());
        }
        self.module(key)
            .ok_or_else(|| RegistryError::not_found(format!("module {key}")))
    }

    async fn get_vcs_connection(&self, identifier: &str) -> Result<VcsConnectionInfo> {
        self.connection_calls.fetch_add(1, Ordering::SeqCst);
        if !self.connections.lock().unwrap().contains(identifier) {
            return Err(RegistryError::not_found(format!("VCS connection {identifier}")));
        }
        Ok(VcsConnectionInfo {
            id: identifier.to_string(),
            kind: VcsKind::detect(identifier).unwrap_or(VcsKind::OAuthToken),
            service_provider: None,
        })
    }

    async fn set_module_vcs_source(
        &self,
        key: &ModuleKey,
        vcs_identifier: &str,
        repo_identifier: &str,
    ) -> Result<ModuleRegistryEntry> {
        self.patches.lock().unwrap().push(PatchCall {
            key: key.clone(),
            vcs: vcs_identifier.to_string(),
            repo: repo_identifier.to_string(),
        });
        if let Some(cancellation) = self.cancel_on_patch.lock().unwrap().get(key) {
            cancellation.cancel();
        }
        if let Some(error) = self.failing_reads_after_patch.lock().unwrap().remove(key) {
            self.get_errors.lock().unwrap().insert(key.clone(), error);
        }

        if let Some(error) = self.failing_patches.lock().unwrap().get(key) {
            return Err(error.clone());
        }
        if let Some(errors) = self.scripted_patch_errors.lock().unwrap().get_mut(key) {
            if let Some(error) = errors.pop_front() {
                return Err(error);
            }
        }

        let mut modules = self.modules.lock().unwrap();
        let entry = modules
            .get_mut(key)
            .ok_or_else(|| RegistryError::not_found(format!("module {key}")))?;
        if entry.publishing_mode != PublishingMode::Tag {
            return Err(RegistryError::conflict(format!(
                "module {key} is not published from tags"
            )));
        }
        if self.lost_patches.lock().unwrap().contains(key) {
            return Ok(entry.clone());
        }

        entry.vcs_identifier = Some(vcs_identifier.to_string());
        entry.repo_identifier = Some(repo_identifier.to_string());
        entry.display_identifier = Some(repo_identifier.to_string());
        Ok(entry.clone())
    }

    async fn list_modules(&self) -> Result<Vec<ModuleRegistryEntry>> {
        let mut modules: Vec<_> = self.modules.lock().unwrap().values().cloned().collect();
        modules.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(modules)
    }

    async fn check_connection(&self) -> Result<()> {
        Ok(())
    }
}

pub fn entry(name: &str, vcs: &str, repo: &str, mode: PublishingMode) -> ModuleRegistryEntry {
    ModuleRegistryEntry {
        key: ModuleKey::new("acme", name, "aws"),
        vcs_identifier: Some(vcs.to_string()),
        repo_identifier: Some(repo.to_string()),
        display_identifier: Some(repo.to_string()),
        branch: None,
        publishing_mode: mode,
    }
}

/// Module `acme/<name>/aws` sourced from `ot-old` / `acme-old/<name>`.
pub fn tag_module(name: &str) -> ModuleRegistryEntry {
    entry(name, "ot-old", &format!("acme-old/{name}"), PublishingMode::Tag)
}

pub fn record(name: &str) -> PlanRecord {
    PlanRecord {
        module_namespace: "acme".to_string(),
        module_name: name.to_string(),
        module_provider: "aws".to_string(),
        src_vcs_identifier: "ot-old".to_string(),
        dst_vcs_identifier: "ot-new".to_string(),
        src_repo_identifier: format!("acme-old/{name}"),
        dst_repo_identifier: format!("acme-new/{name}"),
    }
}

pub fn key(name: &str) -> ModuleKey {
    ModuleKey::new("acme", name, "aws")
}

/// Executor settings that never sleep between retries.
pub fn fast_config(parallelism: usize) -> ExecutorConfig {
    ExecutorConfig {
        retry: RetryPolicy::immediate(3),
        parallelism,
    }
}
