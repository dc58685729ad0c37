use crate::migration::{Classification, OutcomeStatus, RunReport, ValidationReport};
use crate::plan::PlanRecord;
use std::io::{self, Write};

const PLAN_HEADERS: [&str; 5] = ["Module", "Source VCS", "Source Repo", "Dest VCS", "Dest Repo"];

/// Render rows as a plain aligned table.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let format_row = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!(" {cell:<width$} "))
            .collect::<Vec<_>>()
            .join("|")
    };

    let mut out = String::new();
    out.push_str(&format_row(headers.to_vec()));
    out.push('\n');
    out.push_str(&separator);
    out.push('\n');
    for row in rows {
        out.push_str(&format_row(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

fn plan_row(record: &PlanRecord) -> Vec<String> {
    vec![
        record.module_key().to_string(),
        record.src_vcs_identifier.clone(),
        record.src_repo_identifier.clone(),
        record.dst_vcs_identifier.clone(),
        record.dst_repo_identifier.clone(),
    ]
}

/// Print a freshly built plan
pub fn print_plan(records: &[PlanRecord]) {
    println!("📋 Migration Plan ({} modules)", records.len());
    println!("===================================================");
    let rows: Vec<_> = records.iter().map(plan_row).collect();
    print!("{}", render_table(&PLAN_HEADERS, &rows));
}

/// Write validator output so the operator can confirm the eligible records.
/// JSON mode emits the serialized report instead of the table.
pub fn write_preview<W: Write>(
    out: &mut W,
    preview: &ValidationReport,
    json: bool,
) -> io::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, preview)?;
        return writeln!(out);
    }

    writeln!(out, "🔍 Migration Preview")?;
    writeln!(out, "===================================================")?;

    let mut headers = PLAN_HEADERS.to_vec();
    headers.push("Status");
    let rows: Vec<_> = preview
        .records
        .iter()
        .map(|validated| {
            let mut row = plan_row(&validated.record);
            row.push(match &validated.classification {
                Classification::Eligible => "eligible".to_string(),
                Classification::Skipped(reason) => format!("skip: {reason}"),
                Classification::Failed(reason) => format!("fail: {reason}"),
            });
            row
        })
        .collect();
    write!(out, "{}", render_table(&headers, &rows))?;

    writeln!(out)?;
    writeln!(
        out,
        "  • Eligible: {}/{} modules",
        preview.eligible_count(),
        preview.len()
    )
}

/// Print the summary of a finished run
pub fn print_run_report(report: &RunReport) {
    let counts = report.counts();

    println!();
    println!("📊 Migration Summary (run {})", report.run_id);
    println!("===================================================");
    println!("  ✅ Succeeded: {}", counts.success);
    println!("  ⏭️  Skipped: {}", counts.skipped);
    println!("  ❌ Failed: {}", counts.failed);
    if report.cancelled {
        println!("  ⚠️  Cancelled: {} modules not started", report.not_started());
    }

    let unsuccessful = report.unsuccessful();
    if !unsuccessful.is_empty() {
        println!();
        println!("Modules needing attention:");
        for outcome in unsuccessful {
            let icon = match outcome.status() {
                OutcomeStatus::Failed => "❌",
                _ => "⏭️ ",
            };
            println!(
                "  {} {} [{}] {}",
                icon,
                outcome.record().module_key(),
                outcome.status(),
                outcome.reason().unwrap_or_default()
            );
        }
    }
}
