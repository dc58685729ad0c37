use crate::cli::options::MigrateOptions;
use crate::cli::output::{print_plan, print_run_report, write_preview};
use crate::migration::{CancellationFlag, MigrationEngine, RunReport, ValidationReport};
use crate::plan::{load_plan, save_plan, PlanBuilder, PlanError, PlanRecord};
use crate::registry::RegistryClient;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CANCELLED: i32 = 130;

/// How a `migrate` invocation ended.
#[derive(Debug)]
pub enum MigrateResult {
    /// Preview only; nothing was changed.
    DryRun(ValidationReport),
    /// The operator declined the confirmation.
    Declined(ValidationReport),
    Completed(RunReport),
}

impl MigrateResult {
    pub fn exit_code(&self) -> i32 {
        match self {
            MigrateResult::Completed(report) if report.has_failures() => EXIT_FAILURE,
            MigrateResult::Completed(report) if report.cancelled => EXIT_CANCELLED,
            _ => EXIT_SUCCESS,
        }
    }
}

/// Query the registry and write a plan file for the selected modules.
pub async fn run_plan(
    client: &dyn RegistryClient,
    builder: &PlanBuilder,
    plan_file: &Path,
) -> Result<Vec<PlanRecord>> {
    if plan_file.exists() {
        return Err(PlanError::PlanFileExists {
            path: plan_file.to_path_buf(),
        }
        .into());
    }

    let records = builder.build(client).await?;
    if records.is_empty() {
        info!("No modules match migration criteria; no plan written");
        return Ok(records);
    }

    save_plan(plan_file, &records)
        .with_context(|| format!("Failed to write plan file {}", plan_file.display()))?;
    print_plan(&records);
    println!();
    println!("📄 Plan written to {}", plan_file.display());
    Ok(records)
}

/// Preview a plan file, confirm with the operator, then apply it.
pub async fn run_migrate<C>(
    client: Arc<dyn RegistryClient>,
    options: &MigrateOptions,
    cancellation: CancellationFlag,
    confirm: C,
) -> Result<MigrateResult>
where
    C: FnOnce(&ValidationReport) -> Result<bool>,
{
    let plan = load_plan(&options.plan_file)
        .with_context(|| format!("Failed to load plan file {}", options.plan_file.display()))?;
    info!("Loaded {} records from {}", plan.len(), options.plan_file.display());

    let engine =
        MigrationEngine::new(client, options.executor.clone()).with_cancellation(cancellation);
    let preview = engine.preview(&plan).await?;
    write_preview(&mut std::io::stdout().lock(), &preview, options.json)?;

    if options.dry_run {
        if !options.json {
            println!();
            println!("✅ Dry run completed; no modules were changed");
        }
        return Ok(MigrateResult::DryRun(preview));
    }

    // Skipped and failed records still become outcomes in the run report.
    if preview.eligible_count() == 0 {
        info!("No modules are eligible for migration");
    } else if !options.assume_yes && !confirm(&preview)? {
        info!("Migration aborted by operator");
        return Ok(MigrateResult::Declined(preview));
    }

    let report = engine.execute(&preview).await;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_run_report(&report);
    }
    Ok(MigrateResult::Completed(report))
}
