//! Per-state job counts.

use crate::render::banner;
use roost_core::{JobRecord, JobStatus};
use std::collections::BTreeMap;
use std::fmt::Write;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Count jobs by status code.
pub fn counts_from_jobs(jobs: &[JobRecord]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for job in jobs {
        if let Some(code) = job.job_status {
            *counts.entry(code).or_insert(0) += 1;
        }
    }
    counts
}

/// Status breakdown in the fetch-output style.
pub fn breakdown_lines(counts: &BTreeMap<i64, usize>) -> String {
    let mut out = String::new();
    for (code, count) in counts {
        let _ = writeln!(
            out,
            "  {:<15}: {:>6} jobs",
            JobStatus::from_code(*code).name(),
            count
        );
    }
    out
}

/// Render the status summary table for the summarise report.
pub fn render_counts(cluster: u64, counts: &BTreeMap<i64, usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", banner("HTCondor Cluster Job Summary"));
    let _ = writeln!(out, "Cluster ID: {}\n", cluster);

    let total: usize = counts.values().sum();
    if total == 0 {
        let _ = writeln!(out, "No jobs found in history or queue.");
        return out;
    }

    let mut builder = Builder::default();
    builder.push_record(["Status", "Jobs", "Share"]);
    for (code, count) in counts {
        builder.push_record(vec![
            JobStatus::from_code(*code).name(),
            count.to_string(),
            format!("{:.1}%", *count as f64 / total as f64 * 100.0),
        ]);
    }
    builder.push_record(vec!["Total".to_string(), total.to_string(), String::new()]);
    let mut table = builder.build();
    table.with(Style::ascii());
    let _ = writeln!(out, "{}", table);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with_status(proc: i64, status: i64) -> JobRecord {
        JobRecord {
            cluster_id: 9,
            proc_id: proc,
            job_status: Some(status),
            ..JobRecord::default()
        }
    }

    #[test]
    fn test_counts_from_jobs() {
        let jobs = vec![
            job_with_status(0, 4),
            job_with_status(1, 4),
            job_with_status(2, 5),
            job_with_status(3, 2),
        ];
        let counts = counts_from_jobs(&jobs);
        assert_eq!(counts.get(&4), Some(&2));
        assert_eq!(counts.get(&5), Some(&1));
        assert_eq!(counts.get(&2), Some(&1));
    }

    #[test]
    fn test_render_counts() {
        let jobs = vec![job_with_status(0, 4), job_with_status(1, 5)];
        let text = render_counts(9, &counts_from_jobs(&jobs));
        assert!(text.contains("Cluster ID: 9"));
        assert!(text.contains("Completed"));
        assert!(text.contains("Held"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("Total"));
    }

    #[test]
    fn test_render_counts_empty() {
        let text = render_counts(9, &BTreeMap::new());
        assert!(text.contains("No jobs found"));
    }

    #[test]
    fn test_breakdown_lines() {
        let jobs = vec![job_with_status(0, 1)];
        let text = breakdown_lines(&counts_from_jobs(&jobs));
        assert!(text.contains("Idle"));
        assert!(text.contains("1 jobs"));
    }
}
