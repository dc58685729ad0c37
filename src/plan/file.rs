//! CSV plan files.
//!
//! Columns: `module_namespace,module_name,module_provider,src_vcs,dst_vcs,src_repo,dst_repo`.

use super::error::{PlanError, Result};
use super::record::PlanRecord;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Load plan records from a CSV file, rejecting malformed rows.
pub fn load_plan(path: &Path) -> Result<Vec<PlanRecord>> {
    debug!("Reading migration plan from {}", path.display());
    let file = std::fs::File::open(path)?;
    read_plan(file)
}

pub fn read_plan<R: Read>(reader: R) -> Result<Vec<PlanRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| PlanError::MalformedRow {
            line: e.position().map(|p| p.line() as usize).unwrap_or_default(),
            reason: e.to_string(),
        })?;
        let line = row.position().map(|p| p.line() as usize).unwrap_or_default();

        if row.iter().all(str::is_empty) {
            continue;
        }

        let record: PlanRecord =
            row.deserialize(Some(&headers))
                .map_err(|e| PlanError::MalformedRow {
                    line,
                    reason: e.to_string(),
                })?;
        record.validate().map_err(|e| PlanError::MalformedRow {
            line,
            reason: e.to_string(),
        })?;
        records.push(record);
    }

    debug!("Loaded {} plan records", records.len());
    Ok(records)
}

/// Write plan records to a new CSV file. Never overwrites an existing plan.
pub fn save_plan(path: &Path, records: &[PlanRecord]) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => PlanError::PlanFileExists {
                path: path.to_path_buf(),
            },
            _ => PlanError::Io(e),
        })?;
    write_plan(file, records)?;
    debug!("Wrote {} plan records to {}", records.len(), path.display());
    Ok(())
}

pub fn write_plan<W: Write>(writer: W, records: &[PlanRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    if records.is_empty() {
        writer.write_record([
            "module_namespace",
            "module_name",
            "module_provider",
            "src_vcs",
            "dst_vcs",
            "src_repo",
            "dst_repo",
        ])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
