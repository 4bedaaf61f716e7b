//! One-screen cluster overview.

use crate::health::assess;
use crate::histogram::runtime_stats;
use crate::render::{banner, bar, section, GREEN, RED, RESET, YELLOW};
use crate::summary;
use roost_core::{hold_code_label, JobRecord};
use roost_parsers::format_seconds_human;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Render the dashboard from a cluster's cached jobs.
pub fn render(cluster: u64, jobs: &[JobRecord]) -> String {
    let health = assess(cluster, jobs);
    let mut out = String::new();

    let _ = writeln!(out, "{}", banner("HTCondor Cluster Dashboard"));
    let _ = writeln!(out, "Cluster ID: {}    Jobs: {}\n", cluster, jobs.len());

    let _ = writeln!(out, "{}", section("Job Status"));
    out.push_str(&summary::breakdown_lines(&summary::counts_from_jobs(jobs)));
    out.push('\n');

    let _ = writeln!(out, "{}", section("Utilization"));
    let _ = writeln!(
        out,
        "  Memory usage      {}",
        bar(health.analytics.mem_efficiency.unwrap_or(0.0), 50)
    );
    let _ = writeln!(
        out,
        "  Disk usage        {}",
        bar(health.analytics.disk_efficiency.unwrap_or(0.0), 50)
    );
    let _ = writeln!(
        out,
        "  CPU usage         {}\n",
        bar(health.analytics.cpu_efficiency.unwrap_or(0.0), 50)
    );

    let _ = writeln!(out, "{}", section("Runtime"));
    match runtime_stats(jobs) {
        Some(rt) => {
            let _ = writeln!(
                out,
                "  Median: {}   Mean: {}   P95: {}   Max: {}",
                format_seconds_human(rt.median as u64),
                format_seconds_human(rt.mean as u64),
                format_seconds_human(rt.p95 as u64),
                format_seconds_human(rt.max as u64)
            );
            let _ = writeln!(
                out,
                "  Jobs under 10 minutes: {} ({:.1}%)\n",
                rt.fast_jobs, rt.fast_jobs_pct
            );
        }
        None => {
            let _ = writeln!(out, "  No runtime data recorded.\n");
        }
    }

    let _ = writeln!(out, "{}", section("Held Jobs"));
    if health.held_count == 0 {
        let _ = writeln!(out, "  None held.\n");
    } else {
        let _ = writeln!(
            out,
            "  {} held ({:.1}%)",
            health.held_count, health.held_pct
        );
        for (label, count) in top_hold_codes(jobs, 3) {
            let _ = writeln!(out, "    {:<30} {} job(s)", label, count);
        }
        out.push('\n');
    }

    let color = match health.grade {
        'A' | 'B' => GREEN,
        'C' => YELLOW,
        _ => RED,
    };
    let _ = writeln!(
        out,
        "{}\n  {}Health: {}/100 (Grade {}){}",
        section("Health"),
        color,
        health.score,
        health.grade,
        RESET
    );
    out
}

/// Most common hold codes among the cached held jobs.
fn top_hold_codes(jobs: &[JobRecord], limit: usize) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for job in jobs.iter().filter(|j| j.is_held()) {
        if let Some(code) = job.hold_reason_code {
            *counts.entry(code).or_insert(0) += 1;
        }
    }
    let mut entries: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(code, count)| (hold_code_label(code), count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(limit);
    entries
}
