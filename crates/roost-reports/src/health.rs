//! Composite cluster health scoring.
//!
//! Starts from 100 and deducts per finding; each finding carries an
//! explanation and a suggested fix.

use crate::analytics::{analyze, ClusterAnalytics};
use crate::histogram::{runtime_stats, RuntimeStats};
use crate::render::{banner, bar, GREEN, RED, RESET, YELLOW};
use roost_core::JobRecord;
use roost_parsers::format_seconds_human;
use std::fmt::Write;

#[derive(Debug, Clone)]
pub struct Finding {
    pub deduction: i64,
    pub explanation: String,
    pub suggestion: String,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub cluster: u64,
    pub score: i64,
    pub grade: char,
    pub findings: Vec<Finding>,
    pub total_jobs: usize,
    pub held_count: usize,
    pub held_pct: f64,
    pub analytics: ClusterAnalytics,
    pub runtime: Option<RuntimeStats>,
}

fn grade_for(score: i64) -> char {
    match score {
        90..=100 => 'A',
        75..=89 => 'B',
        60..=74 => 'C',
        40..=59 => 'D',
        _ => 'F',
    }
}

fn efficiency_finding(
    resource: &str,
    efficiency: Option<f64>,
    severe: i64,
    advisory: i64,
) -> Option<Finding> {
    let eff = efficiency?;
    if eff < 15.0 {
        Some(Finding {
            deduction: severe,
            explanation: format!(
                "{} efficiency is {:.1}% - significant over-provisioning.",
                resource, eff
            ),
            suggestion: format!(
                "Reduce the {} request toward observed usage (see analytics).",
                resource.to_lowercase()
            ),
        })
    } else if eff < 50.0 {
        Some(Finding {
            deduction: advisory,
            explanation: format!("{} efficiency is {:.1}%.", resource, eff),
            suggestion: format!(
                "Consider trimming the {} request.",
                resource.to_lowercase()
            ),
        })
    } else {
        None
    }
}

/// Assess cluster health from cached job records.
pub fn assess(cluster: u64, jobs: &[JobRecord]) -> HealthReport {
    let analytics = analyze(jobs);
    let runtime = runtime_stats(jobs);
    let held_count = jobs.iter().filter(|j| j.is_held()).count();
    let held_pct = if jobs.is_empty() {
        0.0
    } else {
        held_count as f64 / jobs.len() as f64 * 100.0
    };

    let mut findings = Vec::new();

    if let Some(f) = efficiency_finding("Memory", analytics.mem_efficiency, 20, 10) {
        findings.push(f);
    }
    if let Some(f) = efficiency_finding("CPU", analytics.cpu_efficiency, 20, 10) {
        findings.push(f);
    }
    if let Some(f) = efficiency_finding("Disk", analytics.disk_efficiency, 10, 5) {
        findings.push(f);
    }

    if held_pct > 25.0 {
        findings.push(Finding {
            deduction: 20,
            explanation: format!(
                "{:.1}% of jobs are held ({} of {}).",
                held_pct, held_count, jobs.len()
            ),
            suggestion: "Run hold-bucket to categorize the hold reasons.".to_string(),
        });
    } else if held_pct > 5.0 {
        findings.push(Finding {
            deduction: 10,
            explanation: format!("{:.1}% of jobs are held.", held_pct),
            suggestion: "Run hold-bucket to categorize the hold reasons.".to_string(),
        });
    }

    if let Some(rt) = &runtime {
        if rt.fast_jobs_pct > 50.0 {
            findings.push(Finding {
                deduction: 15,
                explanation: format!(
                    "{:.1}% of jobs finish in under 10 minutes.",
                    rt.fast_jobs_pct
                ),
                suggestion: "Batch short tasks together; scheduling overhead dominates."
                    .to_string(),
            });
        } else if rt.fast_jobs_pct > 25.0 {
            findings.push(Finding {
                deduction: 8,
                explanation: format!(
                    "{:.1}% of jobs finish in under 10 minutes.",
                    rt.fast_jobs_pct
                ),
                suggestion: "Consider batching short tasks.".to_string(),
            });
        }
        if rt.cv > 1.0 {
            findings.push(Finding {
                deduction: 5,
                explanation: format!(
                    "Runtime is highly variable (coefficient of variation {:.2}).",
                    rt.cv
                ),
                suggestion: "Check the histogram for bimodal runtime groups.".to_string(),
            });
        }
    }

    let deducted: i64 = findings.iter().map(|f| f.deduction).sum();
    let score = (100 - deducted).max(0);

    HealthReport {
        cluster,
        score,
        grade: grade_for(score),
        findings,
        total_jobs: jobs.len(),
        held_count,
        held_pct,
        analytics,
        runtime,
    }
}

fn pct_or_na(v: Option<f64>) -> String {
    v.map(|p| format!("{:.1}%", p)).unwrap_or_else(|| "N/A".to_string())
}

/// Render the health report.
pub fn render(report: &HealthReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", banner("HTCondor Cluster Health Report"));
    let _ = writeln!(out, "{:>20}: {}", "Cluster ID", report.cluster);
    let _ = writeln!(out, "{:>20}: {}", "Job Count", report.total_jobs);
    let _ = writeln!(
        out,
        "{:>20}: {} ({:.1}%)",
        "Held Jobs", report.held_count, report.held_pct
    );
    let avg = report
        .analytics
        .avg_runtime_secs
        .map(|s| format_seconds_human(s as u64))
        .unwrap_or_else(|| "N/A".to_string());
    let _ = writeln!(out, "{:>20}: {}\n", "Avg Runtime", avg);

    let color = match report.grade {
        'A' | 'B' => GREEN,
        'C' => YELLOW,
        _ => RED,
    };
    let _ = writeln!(
        out,
        "  Health Score: {}{}/100 (Grade {}){}\n",
        color, report.score, report.grade, RESET
    );
    let _ = writeln!(out, "  Score {}", bar(report.score as f64, 50));
    out.push('\n');

    let _ = writeln!(
        out,
        "  Memory efficiency : {}",
        pct_or_na(report.analytics.mem_efficiency)
    );
    let _ = writeln!(
        out,
        "  CPU efficiency    : {}",
        pct_or_na(report.analytics.cpu_efficiency)
    );
    let _ = writeln!(
        out,
        "  Disk efficiency   : {}\n",
        pct_or_na(report.analytics.disk_efficiency)
    );

    if report.findings.is_empty() {
        let _ = writeln!(out, "  ✅ No issues detected.");
    } else {
        let _ = writeln!(out, "  Findings:");
        for finding in &report.findings {
            let _ = writeln!(
                out,
                "  ⚠️  [-{:>2}] {}",
                finding.deduction, finding.explanation
            );
            let _ = writeln!(out, "           {}", finding.suggestion);
        }
    }
    out
}
