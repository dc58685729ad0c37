mod common;

use common::{entry, fast_config, key, record, tag_module, FakeRegistry};
use std::path::Path;
use tempfile::TempDir;
use terraform_module_migration::cli::{run_migrate, run_plan, MigrateOptions, MigrateResult};
use terraform_module_migration::migration::CancellationFlag;
use terraform_module_migration::plan::{load_plan, save_plan, PlanBuilder, PlanRecord};
use terraform_module_migration::registry::{PublishingMode, RegistryError};

fn options(plan_file: &Path) -> MigrateOptions {
    MigrateOptions {
        plan_file: plan_file.to_path_buf(),
        dry_run: false,
        assume_yes: true,
        json: false,
        executor: fast_config(1),
    }
}

fn write_plan(dir: &TempDir, records: &[PlanRecord]) -> std::path::PathBuf {
    let path = dir.path().join("plan.csv");
    save_plan(&path, records).unwrap();
    path
}

fn registry() -> std::sync::Arc<FakeRegistry> {
    FakeRegistry::new()
        .with_module(tag_module("vpc"))
        .with_module(tag_module("eks"))
        .with_connection("ot-new")
}

#[tokio::test]
async fn test_dry_run_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write_plan(&dir, &[record("vpc"), record("eks")]);
    let registry = registry();
    let mut opts = options(&path);
    opts.dry_run = true;

    let result = run_migrate(registry.clone(), &opts, CancellationFlag::new(), |_| {
        panic!("dry run must not ask for confirmation")
    })
    .await
    .unwrap();

    match &result {
        MigrateResult::DryRun(preview) => assert_eq!(preview.eligible_count(), 2),
        other => panic!("Expected DryRun, got {other:?}"),
    }
    assert_eq!(result.exit_code(), 0);
    assert_eq!(registry.patch_count(), 0);
}

#[tokio::test]
async fn test_declined_confirmation_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write_plan(&dir, &[record("vpc")]);
    let registry = registry();
    let mut opts = options(&path);
    opts.assume_yes = false;

    let result = run_migrate(registry.clone(), &opts, CancellationFlag::new(), |preview| {
        assert_eq!(preview.eligible_count(), 1);
        Ok(false)
    })
    .await
    .unwrap();

    assert!(matches!(result, MigrateResult::Declined(_)));
    assert_eq!(registry.patch_count(), 0);
}

#[tokio::test]
async fn test_confirmed_run_completes() {
    let dir = TempDir::new().unwrap();
    let path = write_plan(&dir, &[record("vpc"), record("eks")]);
    let registry = registry();
    let mut opts = options(&path);
    opts.assume_yes = false;

    let result = run_migrate(registry.clone(), &opts, CancellationFlag::new(), |_| Ok(true))
        .await
        .unwrap();

    match &result {
        MigrateResult::Completed(report) => assert_eq!(report.counts().success, 2),
        other => panic!("Expected Completed, got {other:?}"),
    }
    assert_eq!(result.exit_code(), 0);
    assert_eq!(registry.patch_count(), 2);
}

#[tokio::test]
async fn test_failed_record_sets_failure_exit_code() {
    let dir = TempDir::new().unwrap();
    let path = write_plan(&dir, &[record("vpc"), record("eks")]);
    let registry = registry();
    registry.fail_patches(&key("eks"), RegistryError::conflict("rejected"));

    let result = run_migrate(registry.clone(), &options(&path), CancellationFlag::new(), |_| {
        Ok(true)
    })
    .await
    .unwrap();

    assert_eq!(result.exit_code(), 1);
}

#[tokio::test]
async fn test_nothing_eligible_skips_confirmation() {
    let dir = TempDir::new().unwrap();
    let path = write_plan(&dir, &[record("missing")]);
    let registry = registry();
    let mut opts = options(&path);
    opts.assume_yes = false;

    let result = run_migrate(registry.clone(), &opts, CancellationFlag::new(), |_| {
        panic!("nothing to confirm")
    })
    .await
    .unwrap();

    match &result {
        MigrateResult::Completed(report) => {
            assert_eq!(report.counts().skipped, 1);
            assert_eq!(report.outcomes()[0].reason(), Some("module not found"));
        }
        other => panic!("Expected Completed, got {other:?}"),
    }
    assert_eq!(result.exit_code(), 0);
    assert_eq!(registry.patch_count(), 0);
}

#[tokio::test]
async fn test_unknown_destination_connection_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    let mut typo = record("vpc");
    typo.dst_vcs_identifier = "ot-typo".to_string();
    let path = write_plan(&dir, &[typo]);
    let registry = registry();

    let result = run_migrate(registry.clone(), &options(&path), CancellationFlag::new(), |_| {
        panic!("nothing to confirm")
    })
    .await
    .unwrap();

    match &result {
        MigrateResult::Completed(report) => {
            assert_eq!(report.counts().failed, 1);
            assert_eq!(
                report.outcomes()[0].reason(),
                Some("destination VCS connection not found")
            );
        }
        other => panic!("Expected Completed, got {other:?}"),
    }
    assert_eq!(result.exit_code(), 1);
    assert_eq!(registry.patch_count(), 0);
}

#[tokio::test]
async fn test_json_confirmation_receives_full_preview() {
    let dir = TempDir::new().unwrap();
    let path = write_plan(&dir, &[record("vpc"), record("missing")]);
    let registry = registry();
    let mut opts = options(&path);
    opts.assume_yes = false;
    opts.json = true;

    let result = run_migrate(registry.clone(), &opts, CancellationFlag::new(), |preview| {
        assert_eq!(preview.len(), 2);
        assert_eq!(preview.eligible_count(), 1);
        Ok(false)
    })
    .await
    .unwrap();

    assert!(matches!(result, MigrateResult::Declined(_)));
    assert_eq!(registry.patch_count(), 0);
}

#[tokio::test]
async fn test_duplicate_plan_is_rejected_before_mutation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.csv");
    std::fs::write(
        &path,
        "module_namespace,module_name,module_provider,src_vcs,dst_vcs,src_repo,dst_repo\n\
         acme,vpc,aws,ot-old,ot-new,acme-old/vpc,acme-new/vpc\n\
         acme,vpc,aws,ot-old,ot-new,acme-old/vpc,acme-other/vpc\n",
    )
    .unwrap();
    let registry = registry();

    let err = run_migrate(registry.clone(), &options(&path), CancellationFlag::new(), |_| {
        Ok(true)
    })
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("more than once"));
    assert_eq!(registry.patch_count(), 0);
    assert_eq!(registry.get_count(), 0);
}

#[tokio::test]
async fn test_malformed_plan_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.csv");
    std::fs::write(
        &path,
        "module_namespace,module_name,module_provider,src_vcs,dst_vcs,src_repo,dst_repo\n\
         acme,vpc,aws,ot-old,new-token,acme-old/vpc,acme-new/vpc\n",
    )
    .unwrap();
    let registry = registry();

    let err = run_migrate(registry.clone(), &options(&path), CancellationFlag::new(), |_| {
        Ok(true)
    })
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("row 2"));
    assert_eq!(registry.get_count(), 0);
}

#[tokio::test]
async fn test_plan_command_writes_selected_modules() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.csv");
    let registry = FakeRegistry::new()
        .with_module(tag_module("vpc"))
        .with_module(entry("eks", "ot-other", "acme-old/eks", PublishingMode::Tag))
        .with_module(entry("rds", "ot-old", "elsewhere/rds", PublishingMode::Tag));
    let builder = PlanBuilder::new("acme-old", "acme-new", "ot-old", "ot-new").unwrap();

    let records = run_plan(registry.as_ref(), &builder, &path).await.unwrap();

    assert_eq!(records, vec![record("vpc")]);
    assert_eq!(load_plan(&path).unwrap(), records);
}

#[tokio::test]
async fn test_plan_command_refuses_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.csv");
    std::fs::write(&path, "existing").unwrap();
    let builder = PlanBuilder::new("acme-old", "acme-new", "ot-old", "ot-new").unwrap();

    let err = run_plan(registry().as_ref(), &builder, &path).await.unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
}
