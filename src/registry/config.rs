use super::error::{RegistryError, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_REGISTRY_URL: &str = "https://app.terraform.io";

pub const TOKEN_ENV: &str = "TFC_TOKEN";
pub const ORGANIZATION_ENV: &str = "TFC_ORGANIZATION";
pub const URL_ENV: &str = "TFC_URL";

/// Connection settings for the registry API, passed explicitly to the client.
#[derive(Clone)]
pub struct RegistryConfig {
    pub base_url: Url,
    pub token: String,
    pub organization: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("organization", &self.organization)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RegistryConfig {
    pub fn new(base_url: &str, token: &str, organization: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            RegistryError::Configuration(format!("Invalid registry URL '{base_url}': {e}"))
        })?;
        if token.trim().is_empty() {
            return Err(RegistryError::Configuration(format!(
                "{TOKEN_ENV} must not be empty"
            )));
        }
        if organization.trim().is_empty() {
            return Err(RegistryError::Configuration(format!(
                "{ORGANIZATION_ENV} must not be empty"
            )));
        }

        Ok(Self {
            base_url,
            token: token.to_string(),
            organization: organization.to_string(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Build the configuration from `TFC_TOKEN`, `TFC_ORGANIZATION` and `TFC_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_ENV);
        let organization = lookup(ORGANIZATION_ENV);
        let (Some(token), Some(organization)) = (token, organization) else {
            return Err(RegistryError::Configuration(format!(
                "{TOKEN_ENV} and {ORGANIZATION_ENV} environment variables must be set"
            )));
        };
        let base_url = lookup(URL_ENV).unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());

        Self::new(&base_url, &token, &organization)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join an API path (relative to `/api/v2/`) onto the base URL.
    pub fn api_url(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = format!("{base}/api/v2/{}", path.trim_start_matches('/'));
        Url::parse(&url)
            .map_err(|e| RegistryError::Configuration(format!("Invalid API URL '{url}': {e}")))
    }
}
