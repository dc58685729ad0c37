use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Registry rejected credentials: {reason}")]
    Auth { reason: String },

    #[error("Registry refused the change: {reason}")]
    Conflict { reason: String },

    #[error("Transient registry error: {reason}")]
    Transient { reason: String },

    #[error("Invalid registry response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RegistryError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Only transient failures may be retried; everything else is final for the record.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Classify a non-success HTTP status returned by the registry API.
    pub fn from_status(status: u16, resource: &str, body: &str) -> Self {
        match status {
            404 => Self::not_found(resource),
            401 | 403 => Self::auth(format!("HTTP {status} for {resource}")),
            409 | 422 => Self::conflict(format!("HTTP {status} for {resource}: {body}")),
            408 | 429 | 500..=599 => Self::transient(format!("HTTP {status} for {resource}")),
            _ => Self::conflict(format!("unexpected HTTP {status} for {resource}: {body}")),
        }
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::InvalidResponse {
                reason: err.to_string(),
            };
        }
        if err.is_builder() {
            return Self::Configuration(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16(), "request", "");
        }
        // Connect, timeout and body errors are all worth another attempt.
        Self::transient(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse {
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
