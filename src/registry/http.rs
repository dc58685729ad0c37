//! reqwest-backed registry client speaking the HCP Terraform / Terraform
//! Enterprise JSON:API.

use super::client::RegistryClient;
use super::config::RegistryConfig;
use super::error::{RegistryError, Result};
use super::types::{ModuleKey, ModuleRegistryEntry, PublishingMode, VcsConnectionInfo, VcsKind};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const JSON_API: &str = "application/vnd.api+json";
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct ModuleDocument {
    data: ModuleResource,
}

#[derive(Debug, Deserialize)]
struct ModuleListDocument {
    data: Vec<ModuleResource>,
    #[serde(default)]
    meta: Option<ListMeta>,
}

#[derive(Debug, Deserialize)]
struct ListMeta {
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(rename = "next-page")]
    next_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ModuleResource {
    attributes: ModuleAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ModuleAttributes {
    name: String,
    namespace: String,
    provider: String,
    #[serde(default)]
    publishing_mechanism: Option<String>,
    #[serde(default)]
    no_code: bool,
    #[serde(default)]
    vcs_repo: Option<VcsRepoAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct VcsRepoAttributes {
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    display_identifier: Option<String>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default)]
    oauth_token_id: Option<String>,
    #[serde(default)]
    github_app_installation_id: Option<String>,
    #[serde(default)]
    tags: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ResourceDocument {
    data: Resource,
}

#[derive(Debug, Deserialize)]
struct Resource {
    id: String,
}

impl ModuleResource {
    fn into_entry(self) -> ModuleRegistryEntry {
        let attrs = self.attributes;
        let key = ModuleKey::new(attrs.namespace, attrs.name, attrs.provider);
        let publishing_mode = publishing_mode(
            attrs.no_code,
            attrs.publishing_mechanism.as_deref(),
            attrs.vcs_repo.as_ref(),
        );

        match attrs.vcs_repo {
            Some(repo) => ModuleRegistryEntry {
                key,
                vcs_identifier: repo.oauth_token_id.or(repo.github_app_installation_id),
                repo_identifier: repo.identifier,
                display_identifier: repo.display_identifier,
                branch: repo.branch.filter(|b| !b.is_empty()),
                publishing_mode,
            },
            None => ModuleRegistryEntry {
                key,
                vcs_identifier: None,
                repo_identifier: None,
                display_identifier: None,
                branch: None,
                publishing_mode,
            },
        }
    }
}

fn publishing_mode(
    no_code: bool,
    mechanism: Option<&str>,
    vcs_repo: Option<&VcsRepoAttributes>,
) -> PublishingMode {
    if no_code {
        return PublishingMode::NoCode;
    }
    let Some(repo) = vcs_repo else {
        return PublishingMode::None;
    };
    if mechanism == Some("branch") {
        return PublishingMode::Branch;
    }
    let has_branch = repo.branch.as_deref().is_some_and(|b| !b.is_empty());
    if has_branch && repo.tags != Some(true) {
        return PublishingMode::Branch;
    }
    PublishingMode::Tag
}

pub struct HttpRegistryClient {
    client: Client,
    config: RegistryConfig,
}

impl HttpRegistryClient {
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(concat!("tf-module-migrate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                RegistryError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn module_path(&self, key: &ModuleKey) -> String {
        format!(
            "organizations/{}/registry-modules/private/{}/{}/{}",
            self.config.organization, key.namespace, key.name, key.provider
        )
    }

    /// Send an authenticated request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<String> {
        let response = request
            .bearer_auth(&self.config.token)
            .header("Content-Type", JSON_API)
            .header("Accept", JSON_API)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), resource, "Registry API response");

        if !status.is_success() {
            return Err(RegistryError::from_status(status.as_u16(), resource, &body));
        }
        Ok(body)
    }

    async fn fetch_resource(&self, path: &str, resource: &str) -> Result<Resource> {
        let url = self.config.api_url(path)?;
        let body = self.send(self.client.get(url), resource).await?;
        let document: ResourceDocument = serde_json::from_str(&body)?;
        Ok(document.data)
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn get_module(&self, key: &ModuleKey) -> Result<ModuleRegistryEntry> {
        let url = self.config.api_url(&self.module_path(key))?;
        debug!(module = %key, "Fetching registry module");

        let body = self.send(self.client.get(url), &format!("module {key}")).await?;
        let document: ModuleDocument = serde_json::from_str(&body)?;
        Ok(document.data.into_entry())
    }

    async fn get_vcs_connection(&self, identifier: &str) -> Result<VcsConnectionInfo> {
        let kind = VcsKind::detect(identifier).ok_or_else(|| {
            RegistryError::not_found(format!("VCS connection {identifier}"))
        })?;
        let path = match kind {
            VcsKind::OAuthToken => format!("oauth-tokens/{identifier}"),
            VcsKind::GitHubApp => format!("github-app/installation/{identifier}"),
        };
        debug!(identifier, ?kind, "Fetching VCS connection");

        let resource = self
            .fetch_resource(&path, &format!("VCS connection {identifier}"))
            .await?;
        Ok(VcsConnectionInfo {
            id: resource.id,
            kind,
            service_provider: match kind {
                VcsKind::GitHubApp => Some("github".to_string()),
                VcsKind::OAuthToken => None,
            },
        })
    }

    async fn set_module_vcs_source(
        &self,
        key: &ModuleKey,
        vcs_identifier: &str,
        repo_identifier: &str,
    ) -> Result<ModuleRegistryEntry> {
        let kind = VcsKind::detect(vcs_identifier).ok_or_else(|| {
            RegistryError::conflict(format!("unsupported VCS identifier '{vcs_identifier}'"))
        })?;
        let url = self.config.api_url(&self.module_path(key))?;

        let mut vcs_repo = serde_json::Map::new();
        vcs_repo.insert("identifier".to_string(), json!(repo_identifier));
        vcs_repo.insert("display-identifier".to_string(), json!(repo_identifier));
        vcs_repo.insert(kind.attribute().to_string(), json!(vcs_identifier));
        vcs_repo.insert("tags".to_string(), json!(true));

        let payload = json!({
            "data": {
                "type": "registry-modules",
                "attributes": { "vcs-repo": vcs_repo }
            }
        });
        debug!(module = %key, vcs_identifier, repo_identifier, "Updating module VCS source");

        let body = self
            .send(
                self.client.patch(url).body(payload.to_string()),
                &format!("module {key}"),
            )
            .await?;
        let document: ModuleDocument = serde_json::from_str(&body)?;
        Ok(document.data.into_entry())
    }

    async fn list_modules(&self) -> Result<Vec<ModuleRegistryEntry>> {
        let path = format!("organizations/{}/registry-modules", self.config.organization);
        let mut modules = Vec::new();
        let mut page = Some(1u32);

        while let Some(number) = page {
            let mut url = self.config.api_url(&path)?;
            url.query_pairs_mut()
                .append_pair("page[number]", &number.to_string())
                .append_pair("page[size]", &PAGE_SIZE.to_string());
            debug!(page = number, "Listing registry modules");

            let body = self.send(self.client.get(url), "registry modules").await?;
            let document: ModuleListDocument = serde_json::from_str(&body)?;
            modules.extend(document.data.into_iter().map(ModuleResource::into_entry));

            page = document
                .meta
                .and_then(|meta| meta.pagination)
                .and_then(|pagination| pagination.next_page);
        }

        Ok(modules)
    }

    async fn check_connection(&self) -> Result<()> {
        self.fetch_resource("account/details", "account details")
            .await
            .map(|_| ())
    }
}
