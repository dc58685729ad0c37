use super::error::Result;
use super::types::{ModuleKey, ModuleRegistryEntry, VcsConnectionInfo};
use async_trait::async_trait;

/// Capabilities the migration engine needs from the module registry.
///
/// Implementations must be safe to share across concurrently running records;
/// the only state they hold is read-only connection configuration.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Fetch the current registry entry for a module.
    async fn get_module(&self, key: &ModuleKey) -> Result<ModuleRegistryEntry>;

    /// Look up a VCS connection (OAuth token or GitHub App installation).
    async fn get_vcs_connection(&self, identifier: &str) -> Result<VcsConnectionInfo>;

    /// Repoint a module at a new VCS connection and repository.
    ///
    /// Repeating the same change is a no-op success, so transient failures
    /// may be retried.
    async fn set_module_vcs_source(
        &self,
        key: &ModuleKey,
        vcs_identifier: &str,
        repo_identifier: &str,
    ) -> Result<ModuleRegistryEntry>;

    /// List every private module in the organization.
    async fn list_modules(&self) -> Result<Vec<ModuleRegistryEntry>>;

    /// Verify that the configured credentials are accepted.
    async fn check_connection(&self) -> Result<()>;
}
