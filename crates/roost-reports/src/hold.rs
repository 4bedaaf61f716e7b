//! Held-job analysis: bucket hold reasons and tabulate them.

use crate::similarity;
use roost_core::{hold_code_label, lookup_hold_code, HeldJob};
use roost_parsers::{format_duration_compact, format_timestamp};
use std::collections::BTreeMap;
use std::fmt::Write;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Sort order for bucket rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Most jobs first.
    #[default]
    Count,
    /// Hold reason label, alphabetical.
    Code,
    /// Share of held jobs, descending.
    Percent,
    /// Longest average hold first.
    Time,
}

/// Filtering, bucketing, and output options.
#[derive(Debug, Clone)]
pub struct HoldOptions {
    /// Only show buckets with at least this many jobs.
    pub min_count: usize,
    /// Keep only the top N buckets after sorting.
    pub top: Option<usize>,
    /// Restrict to one HoldReasonCode.
    pub code: Option<i64>,
    /// Similarity threshold for grouping reasons.
    pub threshold: f64,
    pub sort_by: SortBy,
    /// Include proc ids in the table.
    pub show_job_ids: bool,
}

impl Default for HoldOptions {
    fn default() -> Self {
        Self {
            min_count: 1,
            top: None,
            code: None,
            threshold: 0.7,
            sort_by: SortBy::Count,
            show_job_ids: false,
        }
    }
}

/// One bucket of similar hold reasons under a single code.
#[derive(Debug, Clone)]
pub struct BucketRow {
    pub code: i64,
    pub label: String,
    pub subcode: i64,
    pub count: usize,
    /// Share of all held jobs in the cluster.
    pub percent: f64,
    pub avg_hold_secs: Option<f64>,
    /// The bucket's seed reason.
    pub example: String,
    pub proc_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct TimeStats {
    pub first_held: i64,
    pub last_held: i64,
    pub span_hours: f64,
    pub avg_hold_secs: f64,
}

#[derive(Debug, Clone)]
pub struct HoldReport {
    pub cluster: u64,
    pub total_held: usize,
    pub rows: Vec<BucketRow>,
    /// Codes present after filtering, sorted, for the legend.
    pub seen_codes: Vec<i64>,
    pub time_stats: Option<TimeStats>,
}

/// Group reasons into buckets by similarity to each bucket's seed.
pub fn bucket_reasons<'a>(jobs: &[&'a HeldJob], threshold: f64) -> Vec<Vec<&'a HeldJob>> {
    let mut buckets: Vec<Vec<&HeldJob>> = Vec::new();
    for job in jobs {
        let mut placed = false;
        for bucket in &mut buckets {
            if similarity::ratio(&job.reason, &bucket[0].reason) >= threshold {
                bucket.push(job);
                placed = true;
                break;
            }
        }
        if !placed {
            buckets.push(vec![job]);
        }
    }
    buckets
}

fn average_hold(bucket: &[&HeldJob], now_epoch: i64) -> Option<f64> {
    let durations: Vec<f64> = bucket
        .iter()
        .filter(|j| j.entered > 0)
        .map(|j| (now_epoch - j.entered) as f64)
        .collect();
    if durations.is_empty() {
        return None;
    }
    Some(durations.iter().sum::<f64>() / durations.len() as f64)
}

/// Build the hold report from a cluster's held jobs.
pub fn build(cluster: u64, held: &[HeldJob], opts: &HoldOptions, now_epoch: i64) -> HoldReport {
    let total_held = held.len();

    let hold_times: Vec<i64> = held.iter().filter(|j| j.entered > 0).map(|j| j.entered).collect();
    let time_stats = if hold_times.is_empty() {
        None
    } else {
        let first = *hold_times.iter().min().unwrap_or(&0);
        let last = *hold_times.iter().max().unwrap_or(&0);
        let avg_entered = hold_times.iter().sum::<i64>() as f64 / hold_times.len() as f64;
        Some(TimeStats {
            first_held: first,
            last_held: last,
            span_hours: (last - first) as f64 / 3600.0,
            avg_hold_secs: now_epoch as f64 - avg_entered,
        })
    };

    let mut by_code: BTreeMap<i64, Vec<&HeldJob>> = BTreeMap::new();
    for job in held {
        by_code.entry(job.code).or_default().push(job);
    }
    if let Some(code) = opts.code {
        by_code.retain(|c, _| *c == code);
    }

    let mut rows = Vec::new();
    let mut seen_codes: Vec<i64> = by_code.keys().copied().collect();
    seen_codes.sort_unstable();

    for (code, jobs) in &by_code {
        for bucket in bucket_reasons(jobs, opts.threshold) {
            if bucket.len() < opts.min_count {
                continue;
            }
            rows.push(BucketRow {
                code: *code,
                label: hold_code_label(*code),
                subcode: bucket[0].subcode,
                count: bucket.len(),
                percent: if total_held > 0 {
                    bucket.len() as f64 / total_held as f64 * 100.0
                } else {
                    0.0
                },
                avg_hold_secs: average_hold(&bucket, now_epoch),
                example: bucket[0].reason.clone(),
                proc_ids: bucket.iter().map(|j| j.proc_id).collect(),
            });
        }
    }

    match opts.sort_by {
        SortBy::Count => rows.sort_by(|a, b| b.count.cmp(&a.count)),
        SortBy::Code => rows.sort_by(|a, b| a.label.cmp(&b.label)),
        SortBy::Percent => rows.sort_by(|a, b| b.percent.total_cmp(&a.percent)),
        SortBy::Time => rows.sort_by(|a, b| {
            b.avg_hold_secs
                .unwrap_or(0.0)
                .total_cmp(&a.avg_hold_secs.unwrap_or(0.0))
        }),
    }
    if let Some(top) = opts.top {
        rows.truncate(top);
    }

    HoldReport {
        cluster,
        total_held,
        rows,
        seen_codes,
        time_stats,
    }
}

/// Rows for `--export-jobs`: unique held job ids with their codes, sorted.
pub fn export_rows(report: &HoldReport) -> Vec<(String, i64, String)> {
    let mut jobs: Vec<(i64, i64)> = Vec::new();
    for row in &report.rows {
        for proc in &row.proc_ids {
            jobs.push((*proc, row.code));
        }
    }
    jobs.sort_unstable();
    jobs.dedup_by_key(|(proc, _)| *proc);
    jobs.into_iter()
        .map(|(proc, code)| {
            (
                format!("{}.{}", report.cluster, proc),
                code,
                hold_code_label(code),
            )
        })
        .collect()
}

fn job_ids_cell(proc_ids: &[i64]) -> String {
    if proc_ids.len() <= 5 {
        proc_ids
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        let head: Vec<String> = proc_ids[..3].iter().map(|p| p.to_string()).collect();
        format!("{}... (+{} more)", head.join(", "), proc_ids.len() - 3)
    }
}

/// Render the hold report: summary, time analysis, bucket table, legend.
pub fn render(report: &HoldReport, opts: &HoldOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cluster ID: {}", report.cluster);
    let _ = writeln!(out, "Held Jobs in Cluster: {}\n", report.total_held);

    match &report.time_stats {
        Some(ts) => {
            let _ = writeln!(out, "⏱️  Time Analysis:");
            let _ = writeln!(out, "  First held: {}", format_timestamp(ts.first_held));
            let _ = writeln!(out, "  Last held:  {}", format_timestamp(ts.last_held));
            let _ = writeln!(out, "  Duration:   {:.1} hours", ts.span_hours);
            let _ = writeln!(
                out,
                "  Avg hold:   {}\n",
                format_duration_compact(ts.avg_hold_secs)
            );
        }
        None => {
            let _ = writeln!(out, "⏱️  Time Analysis: No timestamp data available\n");
        }
    }

    if report.rows.is_empty() {
        if let Some(code) = opts.code {
            let _ = writeln!(out, "No held jobs found with HoldReasonCode {}", code);
        } else {
            let _ = writeln!(out, "No hold reason buckets matched the filters.");
        }
        return out;
    }

    let mut builder = Builder::default();
    let mut header = vec![
        "Hold Reason Label".to_string(),
        "SubCode".to_string(),
        "% of Held Jobs (Count)".to_string(),
        "Avg Hold Time".to_string(),
        "Example Reason".to_string(),
    ];
    if opts.show_job_ids {
        header.push("Job IDs (ProcId)".to_string());
    }
    builder.push_record(header);

    for row in &report.rows {
        let mut record = vec![
            row.label.clone(),
            row.subcode.to_string(),
            format!("{:.1}% ({})", row.percent, row.count),
            row.avg_hold_secs
                .map(format_duration_compact)
                .unwrap_or_else(|| "N/A".to_string()),
            row.example.clone(),
        ];
        if opts.show_job_ids {
            record.push(job_ids_cell(&row.proc_ids));
        }
        builder.push_record(record);
    }
    let mut table = builder.build();
    table.with(Style::ascii());
    let _ = writeln!(out, "{}", table);

    let _ = writeln!(out, "\nLegend:");
    let mut legend = Builder::default();
    legend.push_record(["Code", "Label", "Reason"]);
    for code in &report.seen_codes {
        let (label, reason) = match lookup_hold_code(*code) {
            Some(info) => (info.label, info.reason),
            None => ("Unknown", "No description available."),
        };
        legend.push_record(vec![code.to_string(), label.to_string(), reason.to_string()]);
    }
    let mut legend_table = legend.build();
    legend_table.with(Style::modern());
    let _ = writeln!(out, "{}", legend_table);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(proc: i64, code: i64, reason: &str, entered: i64) -> HeldJob {
        HeldJob {
            proc_id: proc,
            code,
            subcode: 0,
            reason: reason.to_string(),
            entered,
        }
    }

    fn sample() -> Vec<HeldJob> {
        vec![
            held(0, 34, "memory usage exceeded request_memory (1024 MB)", 1000),
            held(1, 34, "memory usage exceeded request_memory (2048 MB)", 2000),
            held(2, 34, "memory usage exceeded request_memory (4096 MB)", 3000),
            held(3, 13, "Failed to transfer input files", 4000),
            held(4, 1, "via condor_hold (by user alice)", 0),
        ]
    }

    #[test]
    fn test_bucket_similar_reasons() {
        let jobs = sample();
        let refs: Vec<&HeldJob> = jobs.iter().filter(|j| j.code == 34).collect();
        let buckets = bucket_reasons(&refs, 0.7);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].len(), 3);
    }

    #[test]
    fn test_bucket_threshold_splits() {
        let jobs = sample();
        let refs: Vec<&HeldJob> = jobs.iter().collect();
        // near-1.0 threshold keeps every distinct message separate
        let buckets = bucket_reasons(&refs, 0.999);
        assert_eq!(buckets.len(), 5);
    }

    #[test]
    fn test_build_counts_and_percent() {
        let jobs = sample();
        let report = build(4641492, &jobs, &HoldOptions::default(), 10_000);
        assert_eq!(report.total_held, 5);
        assert_eq!(report.rows.len(), 3);
        // sorted by count: memory bucket first
        assert_eq!(report.rows[0].count, 3);
        assert_eq!(report.rows[0].label, "JobOutOfResources");
        assert!((report.rows[0].percent - 60.0).abs() < 1e-9);
        // avg hold over entered=1000,2000,3000 at now=10000 -> 8000s
        assert!((report.rows[0].avg_hold_secs.unwrap() - 8000.0).abs() < 1e-9);
        assert_eq!(report.seen_codes, vec![1, 13, 34]);
    }

    #[test]
    fn test_build_code_filter() {
        let jobs = sample();
        let opts = HoldOptions {
            code: Some(13),
            ..HoldOptions::default()
        };
        let report = build(1, &jobs, &opts, 10_000);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].label, "TransferInputError");
        // percent stays relative to all held jobs
        assert!((report.rows[0].percent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_min_count_and_top() {
        let jobs = sample();
        let opts = HoldOptions {
            min_count: 2,
            ..HoldOptions::default()
        };
        let report = build(1, &jobs, &opts, 10_000);
        assert_eq!(report.rows.len(), 1);

        let opts = HoldOptions {
            top: Some(2),
            ..HoldOptions::default()
        };
        let report = build(1, &jobs, &opts, 10_000);
        assert_eq!(report.rows.len(), 2);
    }

    #[test]
    fn test_missing_entered_gives_no_avg() {
        let jobs = vec![held(0, 1, "via condor_hold", 0)];
        let report = build(1, &jobs, &HoldOptions::default(), 10_000);
        assert!(report.rows[0].avg_hold_secs.is_none());
        assert!(report.time_stats.is_none());
    }

    #[test]
    fn test_export_rows_sorted_unique() {
        let jobs = sample();
        let report = build(77, &jobs, &HoldOptions::default(), 10_000);
        let rows = export_rows(&report);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].0, "77.0");
        assert_eq!(rows[0].1, 34);
        assert_eq!(rows[4].0, "77.4");
        assert_eq!(rows[4].2, "UserRequest");
    }

    #[test]
    fn test_render_table_and_legend() {
        let jobs = sample();
        let opts = HoldOptions::default();
        let report = build(4641492, &jobs, &opts, 10_000);
        let text = render(&report, &opts);
        assert!(text.contains("Held Jobs in Cluster: 5"));
        assert!(text.contains("JobOutOfResources"));
        assert!(text.contains("60.0% (3)"));
        assert!(text.contains("Legend:"));
        assert!(text.contains("Memory usage exceeds a memory limit."));
    }

    #[test]
    fn test_render_code_filter_miss() {
        let opts = HoldOptions {
            code: Some(34),
            ..HoldOptions::default()
        };
        let report = build(1, &[held(0, 1, "x", 0)], &opts, 10_000);
        let text = render(&report, &opts);
        assert!(text.contains("No held jobs found with HoldReasonCode 34"));
    }

    #[test]
    fn test_job_ids_cell_truncation() {
        assert_eq!(job_ids_cell(&[1, 2, 3]), "1, 2, 3");
        assert_eq!(job_ids_cell(&[1, 2, 3, 4, 5, 6, 7]), "1, 2, 3... (+4 more)");
    }
}
