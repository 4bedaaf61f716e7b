//! Held-job bucketing command.

use camino::Utf8Path;
use chrono::Utc;
use miette::{IntoDiagnostic, Result};
use roost_cli::HoldSort;
use roost_condor::query_held_jobs;
use roost_reports::hold::{self, HoldOptions, SortBy};

pub fn options(
    min_count: usize,
    top: Option<usize>,
    code: Option<i64>,
    threshold: f64,
    sort_by: HoldSort,
    show_job_ids: bool,
) -> HoldOptions {
    HoldOptions {
        min_count,
        top,
        code,
        threshold,
        sort_by: match sort_by {
            HoldSort::Count => SortBy::Count,
            HoldSort::Code => SortBy::Code,
            HoldSort::Percent => SortBy::Percent,
            HoldSort::Time => SortBy::Time,
        },
        show_job_ids,
    }
}

pub async fn run(cluster: u64, opts: &HoldOptions, export: Option<&Utf8Path>) -> Result<()> {
    eprintln!("Fetching held jobs from cluster...");
    let held = query_held_jobs(cluster).await.into_diagnostic()?;
    eprintln!("Found {} held jobs\n", held.len());

    if held.is_empty() {
        println!("No held jobs found in cluster {}", cluster);
        return Ok(());
    }

    let report = hold::build(cluster, &held, opts, Utc::now().timestamp());
    print!("{}", hold::render(&report, opts));

    if let Some(path) = export {
        let rows = hold::export_rows(&report);
        let mut writer = csv::Writer::from_path(path).into_diagnostic()?;
        writer
            .write_record(["JobID", "HoldReasonCode", "HoldReasonLabel"])
            .into_diagnostic()?;
        for (job_id, code, label) in &rows {
            let code = code.to_string();
            writer
                .write_record([job_id.as_str(), code.as_str(), label.as_str()])
                .into_diagnostic()?;
        }
        writer.flush().into_diagnostic()?;
        println!("✓ Exported {} unique job IDs to {}\n", rows.len(), path);
    }
    Ok(())
}
