use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use terraform_module_migration::cli::{
    confirm, run_migrate, run_plan, Commands, MigrateCli, MigrateOptions, EXIT_CANCELLED,
    EXIT_FAILURE, EXIT_SUCCESS,
};
use terraform_module_migration::migration::CancellationFlag;
use terraform_module_migration::plan::PlanBuilder;
use terraform_module_migration::registry::{HttpRegistryClient, RegistryClient, RegistryConfig};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = MigrateCli::parse();

    let level = match cli.verbosity {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("Starting tf-module-migrate v{}", env!("CARGO_PKG_VERSION"));

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

async fn run(cli: MigrateCli) -> Result<i32> {
    let config = RegistryConfig::from_env()?.with_timeout(Duration::from_secs(cli.timeout));
    info!(
        "Using registry {} (organization {})",
        config.base_url, config.organization
    );
    let client = HttpRegistryClient::new(config)?;

    check_connection(&client).await?;

    match &cli.command {
        Commands::Plan {
            src_namespace,
            dst_namespace,
            src_vcs,
            dst_vcs,
            plan_file,
        } => {
            let builder = PlanBuilder::new(src_namespace, dst_namespace, src_vcs, dst_vcs)?;
            run_plan(&client, &builder, plan_file).await?;
            Ok(EXIT_SUCCESS)
        }
        command @ Commands::Migrate { .. } => {
            let options = MigrateOptions::from_command(command)
                .context("migrate options missing from command")?;
            let cancellation = CancellationFlag::new();
            spawn_interrupt_handler(cancellation.clone());

            let result = run_migrate(Arc::new(client), &options, cancellation, |_| {
                Ok(confirm("Do you want to proceed?")?)
            })
            .await?;
            Ok(result.exit_code())
        }
    }
}

/// Verify the credentials before doing any work; the operator may continue anyway.
async fn check_connection(client: &HttpRegistryClient) -> Result<()> {
    if let Err(e) = client.check_connection().await {
        error!("Failed to query information from the registry API: {}", e);
        if !confirm("Do you want to continue?")? {
            anyhow::bail!("registry connection check failed: {e}");
        }
    }
    Ok(())
}

/// Stop starting new records on Ctrl+C; records already in flight finish.
fn spawn_interrupt_handler(cancellation: CancellationFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!(
            "Interrupt received; finishing in-flight modules and stopping \
             (press Ctrl+C again to abort)"
        );
        cancellation.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            error!("Second interrupt received; aborting");
            std::process::exit(EXIT_CANCELLED);
        }
    });
}
