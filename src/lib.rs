//! Terraform Module Migration - bulk VCS source migration for private registry modules
//!
//! This crate validates a declarative migration plan against the current state of
//! an HCP Terraform / Terraform Enterprise private registry and repoints each
//! eligible module at a new VCS connection and repository, preserving its tag history.

pub mod cli;
pub mod migration;
pub mod plan;
pub mod registry;

pub use migration::{MigrationEngine, MigrationOutcome, OutcomeStatus, RunReport};
pub use plan::PlanRecord;
pub use registry::{HttpRegistryClient, RegistryClient, RegistryConfig};
