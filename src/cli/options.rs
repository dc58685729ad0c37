use crate::migration::{BackoffStrategy, ExecutorConfig, RetryPolicy};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Bulk-migrate private registry modules between VCS connections
#[derive(Parser)]
#[command(name = "tf-module-migrate")]
#[command(about = "Repoint private registry modules at a new VCS connection and namespace")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct MigrateCli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Registry API timeout per request (seconds)
    #[arg(long, default_value = "30", global = true)]
    pub timeout: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a migration plan CSV from the modules currently in the registry
    Plan {
        /// Source namespace (e.g. GitHub organization) of module repositories
        #[arg(long)]
        src_namespace: String,
        /// Destination namespace of module repositories
        #[arg(long)]
        dst_namespace: String,
        /// Source VCS connection identifier ('ot-*' or 'ghain-*')
        #[arg(long)]
        src_vcs: String,
        /// Destination VCS connection identifier ('ot-*' or 'ghain-*')
        #[arg(long)]
        dst_vcs: String,
        /// Path the plan CSV is written to; must not exist yet
        #[arg(long)]
        plan_file: PathBuf,
    },

    /// Validate and apply a migration plan CSV
    Migrate {
        /// Plan CSV to apply
        #[arg(long)]
        plan_file: PathBuf,
        /// Show what would be migrated without changing anything
        #[arg(long)]
        dry_run: bool,
        /// Skip the interactive confirmation
        #[arg(long)]
        yes: bool,
        /// Number of modules migrated at the same time
        #[arg(long, default_value = "1")]
        parallelism: usize,
        /// Attempts per module update when the registry reports a transient error
        #[arg(long, default_value = "3")]
        max_attempts: u32,
        /// Initial delay between attempts (milliseconds)
        #[arg(long, default_value = "1000")]
        retry_delay_ms: u64,
        /// Print the run report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone)]
pub struct MigrateOptions {
    pub plan_file: PathBuf,
    pub dry_run: bool,
    pub assume_yes: bool,
    pub json: bool,
    pub executor: ExecutorConfig,
}

impl MigrateOptions {
    pub fn from_command(command: &Commands) -> Option<Self> {
        let Commands::Migrate {
            plan_file,
            dry_run,
            yes,
            parallelism,
            max_attempts,
            retry_delay_ms,
            json,
        } = command
        else {
            return None;
        };

        let delay = Duration::from_millis(*retry_delay_ms);
        Some(Self {
            plan_file: plan_file.clone(),
            dry_run: *dry_run,
            assume_yes: *yes,
            json: *json,
            executor: ExecutorConfig {
                retry: RetryPolicy {
                    max_attempts: (*max_attempts).max(1),
                    delay,
                    max_delay: delay.saturating_mul(10),
                    backoff: BackoffStrategy::Exponential,
                },
                parallelism: (*parallelism).max(1),
            },
        })
    }
}
