use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a private registry module within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleKey {
    pub namespace: String,
    pub name: String,
    pub provider: String,
}

impl ModuleKey {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            provider: provider.into(),
        }
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.name, self.provider)
    }
}

/// How a module's versions get published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishingMode {
    Tag,
    Branch,
    NoCode,
    None,
}

impl PublishingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishingMode::Tag => "tag",
            PublishingMode::Branch => "branch",
            PublishingMode::NoCode => "no-code",
            PublishingMode::None => "none",
        }
    }
}

impl fmt::Display for PublishingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of VCS integration a connection token refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VcsKind {
    /// OAuth token of a VCS provider connection (`ot-*`).
    OAuthToken,
    /// GitHub App installation (`ghain-*`).
    GitHubApp,
}

impl VcsKind {
    /// Detects the kind from the identifier prefix.
    pub fn detect(identifier: &str) -> Option<Self> {
        if identifier.starts_with("ot-") {
            Some(VcsKind::OAuthToken)
        } else if identifier.starts_with("ghain-") {
            Some(VcsKind::GitHubApp)
        } else {
            None
        }
    }

    /// Name of the `vcs-repo` attribute carrying this kind of identifier.
    pub fn attribute(&self) -> &'static str {
        match self {
            VcsKind::OAuthToken => "oauth-token-id",
            VcsKind::GitHubApp => "github-app-installation-id",
        }
    }
}

/// Module state as currently recorded by the registry. Always fetched fresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRegistryEntry {
    pub key: ModuleKey,
    pub vcs_identifier: Option<String>,
    pub repo_identifier: Option<String>,
    pub display_identifier: Option<String>,
    pub branch: Option<String>,
    pub publishing_mode: PublishingMode,
}

impl ModuleRegistryEntry {
    /// True when the module is currently sourced from `vcs` / `repo`.
    pub fn is_sourced_from(&self, vcs: &str, repo: &str) -> bool {
        self.vcs_identifier.as_deref() == Some(vcs) && self.repo_identifier.as_deref() == Some(repo)
    }

    /// Owning organization of the repository, for `org/repo` identifiers.
    pub fn repo_namespace(&self) -> Option<&str> {
        let repo = self.repo_identifier.as_deref()?;
        match repo.split_once('/') {
            Some((org, name)) if !org.is_empty() && !name.is_empty() && !name.contains('/') => {
                Some(org)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsConnectionInfo {
    pub id: String,
    pub kind: VcsKind,
    pub service_provider: Option<String>,
}
