pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::RegistryClient;
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use http::HttpRegistryClient;
pub use types::*;
