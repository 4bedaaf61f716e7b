//! Runtime distribution reports: percentile histogram and scatter plot.

use crate::render::{banner, RED, RESET};
use crate::stats;
use chrono::{DateTime, Utc};
use roost_core::JobRecord;
use roost_parsers::{format_relative, format_seconds_human};
use std::fmt::Write;

const SCATTER_WIDTH: usize = 60;
const SCATTER_HEIGHT: usize = 15;
const HIST_BINS: usize = 10;
const HIST_BAR_WIDTH: usize = 20;
/// Bins whose median runtime falls under this are flagged as too short to
/// use the cluster efficiently.
const FAST_JOB_SECS: f64 = 600.0;

/// Aggregate runtime metrics, shared with the health and dashboard reports.
#[derive(Debug, Clone)]
pub struct RuntimeStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub stdev: f64,
    /// Coefficient of variation (stdev / mean).
    pub cv: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    /// Jobs finishing in under ten minutes.
    pub fast_jobs: usize,
    pub fast_jobs_pct: f64,
    /// Jobs beyond the 95th percentile.
    pub long_jobs: usize,
    /// Pearson correlation of submission index vs runtime.
    pub correlation: Option<f64>,
    pub first_submitted: Option<i64>,
    pub last_completed: Option<i64>,
}

/// Compute runtime statistics over jobs with a positive recorded runtime.
pub fn runtime_stats(jobs: &[JobRecord]) -> Option<RuntimeStats> {
    let runtimes: Vec<f64> = jobs.iter().filter_map(|j| j.runtime_secs()).collect();
    if runtimes.is_empty() {
        return None;
    }
    let mean = stats::mean(&runtimes)?;
    let stdev = stats::stdev_population(&runtimes).unwrap_or(0.0);
    let p95 = stats::percentile(&runtimes, 95.0)?;
    let indices: Vec<f64> = (0..runtimes.len()).map(|i| i as f64).collect();
    let fast_jobs = runtimes.iter().filter(|r| **r < FAST_JOB_SECS).count();

    Some(RuntimeStats {
        count: runtimes.len(),
        mean,
        median: stats::median(&runtimes)?,
        stdev,
        cv: if mean > 0.0 { stdev / mean } else { 0.0 },
        min: runtimes.iter().cloned().fold(f64::MAX, f64::min),
        max: runtimes.iter().cloned().fold(f64::MIN, f64::max),
        p95,
        fast_jobs,
        fast_jobs_pct: fast_jobs as f64 / runtimes.len() as f64 * 100.0,
        long_jobs: runtimes.iter().filter(|r| **r > p95).count(),
        correlation: stats::pearson(&indices, &runtimes),
        first_submitted: jobs.iter().filter_map(|j| j.q_date).min(),
        last_completed: jobs.iter().filter_map(|j| j.completion_date).max(),
    })
}

fn runtime_series(jobs: &[JobRecord]) -> (Vec<usize>, Vec<f64>) {
    let mut indices = Vec::new();
    let mut runtimes = Vec::new();
    for (idx, job) in jobs.iter().enumerate() {
        if let Some(rt) = job.remote_wall_clock {
            indices.push(idx);
            runtimes.push(rt);
        }
    }
    (indices, runtimes)
}

/// Render the job-index vs runtime scatter plot.
///
/// The y-axis is capped at the 95th percentile so a handful of stragglers
/// doesn't flatten the rest of the plot.
pub fn render_scatter(jobs: &[JobRecord]) -> String {
    let (indices, runtimes) = runtime_series(jobs);
    if runtimes.is_empty() {
        return "[WARN] No valid runtime data for scatter plot.\n".to_string();
    }

    let p95 = stats::percentile(&runtimes, 95.0).unwrap_or(0.0);
    let max_runtime = if p95 > 0.0 { p95 } else { 1.0 };
    let outliers = runtimes.iter().filter(|r| **r > p95).count();
    let max_index = jobs.len().saturating_sub(1);

    let mut density = vec![[0usize; SCATTER_WIDTH]; SCATTER_HEIGHT];
    for (idx, rt) in indices.iter().zip(&runtimes) {
        let x = if max_index > 0 {
            *idx * (SCATTER_WIDTH - 1) / max_index
        } else {
            0
        };
        let capped = rt.min(max_runtime);
        let y = ((max_runtime - capped) / max_runtime * (SCATTER_HEIGHT - 1) as f64) as usize;
        density[y.min(SCATTER_HEIGHT - 1)][x.min(SCATTER_WIDTH - 1)] += 1;
    }

    let index_f64: Vec<f64> = indices.iter().map(|i| *i as f64).collect();
    let correlation = stats::pearson(&index_f64, &runtimes);
    let median_runtime = stats::median(&runtimes).unwrap_or(0.0);

    let mut out = String::new();
    let _ = writeln!(out, "\n{}", banner("Job Index vs Runtime Scatter Plot"));
    let _ = writeln!(
        out,
        "Jobs: {}  |  Median: {}  |  Correlation: {}",
        runtimes.len(),
        format_seconds_human(median_runtime as u64),
        correlation
            .map(|c| format!("{:.3}", c))
            .unwrap_or_else(|| "N/A".to_string())
    );
    let trend = match correlation {
        Some(c) if c > 0.4 => "Trend: Later jobs run LONGER ⚠️",
        Some(c) if c < -0.4 => "Trend: Later jobs run FASTER ✓",
        _ => "Trend: Consistent runtime across jobs ✓",
    };
    let _ = writeln!(out, "{}\n", trend);

    for (row, row_density) in density.iter().enumerate() {
        let runtime_val =
            max_runtime - row as f64 / (SCATTER_HEIGHT - 1) as f64 * max_runtime;
        let label = if row == 0 || row == SCATTER_HEIGHT / 2 {
            format_seconds_human(runtime_val as u64)
        } else if row == SCATTER_HEIGHT - 1 {
            "0s".to_string()
        } else {
            String::new()
        };
        let _ = write!(out, "{:>9} |", label);
        for d in row_density {
            out.push(match *d {
                0 => ' ',
                1 => '·',
                2..=3 => '•',
                _ => '█',
            });
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{:>9} +{}", "", "-".repeat(SCATTER_WIDTH));
    let _ = writeln!(
        out,
        "{:>11}0{:^width$}{}",
        "",
        max_index / 2,
        max_index,
        width = SCATTER_WIDTH - 12
    );
    let _ = writeln!(out, "{:>11}Job Index", "");

    let _ = writeln!(out, "\nSymbols: · = 1 job   • = 2-3 jobs   █ = 4+ jobs");
    if outliers > 0 {
        let _ = writeln!(
            out,
            "Note: {} job(s) with runtime > {} (95th percentile) not shown",
            outliers,
            format_seconds_human(p95 as u64)
        );
    }
    out.push('\n');
    out
}

/// Render the runtime histogram over equal-percentile bins.
pub fn render_histogram(
    cluster: u64,
    jobs: &[JobRecord],
    show_fast_jobs: bool,
    now: DateTime<Utc>,
) -> String {
    let mut runtimes = Vec::new();
    let mut ids = Vec::new();
    for job in jobs {
        if let Some(rt) = job.remote_wall_clock {
            runtimes.push(rt);
            ids.push(job.job_id());
        }
    }
    if runtimes.is_empty() {
        return "[WARN] No valid runtime data to plot.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "\n{}", banner("Histogram of Job Runtimes by Percentiles"));
    let _ = writeln!(out, "ClusterId: {}\n", cluster);

    let first_submitted = jobs.iter().filter_map(|j| j.q_date).min();
    let last_completed = jobs.iter().filter_map(|j| j.completion_date).max();
    let _ = writeln!(
        out,
        "First Submitted : {}",
        first_submitted
            .map(|t| format_relative(t, now))
            .unwrap_or_else(|| "N/A".to_string())
    );
    let _ = writeln!(
        out,
        "Last Completed  : {}\n",
        last_completed
            .map(|t| format_relative(t, now))
            .unwrap_or_else(|| "N/A".to_string())
    );

    // 0%, 10%, ..., 100% runtime boundaries
    let edges: Vec<f64> = (0..=HIST_BINS)
        .map(|i| {
            stats::percentile(&runtimes, i as f64 * 100.0 / HIST_BINS as f64).unwrap_or(0.0)
        })
        .collect();

    let header = format!(
        "{:<11}{:<30}| {:<width$} {:>7}",
        "Percentile",
        "Time Range",
        "Histogram",
        "# Jobs",
        width = HIST_BAR_WIDTH
    );
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", "-".repeat(header.chars().count()));

    // first pass for bar scaling
    let bin_jobs: Vec<Vec<usize>> = (0..HIST_BINS)
        .map(|i| bin_members(&runtimes, &edges, i))
        .collect();
    let max_count = bin_jobs.iter().map(|b| b.len()).max().unwrap_or(1).max(1);

    let mut fast_total = 0usize;
    let mut fast_job_ids: Vec<String> = Vec::new();

    for (i, members) in bin_jobs.iter().enumerate() {
        let in_bin: Vec<f64> = members.iter().map(|m| runtimes[*m]).collect();
        let median_time = stats::median(&in_bin).unwrap_or(0.0);
        let is_fast = median_time < FAST_JOB_SECS;
        if is_fast {
            fast_total += in_bin.len();
            fast_job_ids.extend(members.iter().map(|m| ids[*m].clone()));
        }

        let time_range = format!(
            "{:>10} - {:>10}",
            format_seconds_human(edges[i] as u64),
            format_seconds_human(edges[i + 1] as u64)
        );
        let pct_range = format!(
            "{:02}–{:02}%",
            i * 100 / HIST_BINS,
            (i + 1) * 100 / HIST_BINS
        );
        let fill = "█".repeat(members.len() * HIST_BAR_WIDTH / max_count);
        let (color, reset) = if is_fast { (RED, RESET) } else { ("", "") };
        let _ = writeln!(
            out,
            "{:<11}{:>30} | {}{:<width$}{} {:>7}",
            pct_range,
            time_range,
            color,
            fill,
            reset,
            members.len(),
            width = HIST_BAR_WIDTH
        );
    }

    let _ = writeln!(
        out,
        "\n{}Note:{} Bars in red represent bins with median runtime < 10 minutes.",
        RED, RESET
    );
    let _ = writeln!(
        out,
        "{}Info:{} Total number of jobs in such bins: {}",
        RED, RESET, fast_total
    );

    if show_fast_jobs && !fast_job_ids.is_empty() {
        let _ = writeln!(out, "\nList of Job IDs with median runtime < 10 minutes:");
        let _ = writeln!(out, "{}", fast_job_ids.join(", "));
    }
    out
}

/// Indices of the runtimes falling into percentile bin `i`.
///
/// Bins are half-open [left, right), except the last which includes its
/// right edge.
fn bin_members(runtimes: &[f64], edges: &[f64], i: usize) -> Vec<usize> {
    let left = edges[i];
    let right = edges[i + 1];
    let last = i == edges.len() - 2;
    runtimes
        .iter()
        .enumerate()
        .filter(|(_, rt)| {
            if last {
                **rt >= left && **rt <= right
            } else {
                **rt >= left && **rt < right
            }
        })
        .map(|(idx, _)| idx)
        .collect()
}
