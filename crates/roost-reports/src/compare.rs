//! Two-cluster comparison.

use crate::analytics::analyze;
use crate::health::assess;
use crate::render::banner;
use roost_core::JobRecord;
use roost_parsers::format_seconds_human;
use std::fmt::Write;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Headline metrics for one cluster, as used by the compare table.
#[derive(Debug, Clone)]
pub struct ClusterSnapshot {
    pub cluster: u64,
    pub total_jobs: usize,
    pub held_pct: f64,
    pub avg_runtime_secs: Option<f64>,
    pub mem_eff: Option<f64>,
    pub cpu_eff: Option<f64>,
    pub disk_eff: Option<f64>,
    pub score: i64,
    pub grade: char,
}

impl ClusterSnapshot {
    pub fn from_jobs(cluster: u64, jobs: &[JobRecord]) -> Self {
        let analytics = analyze(jobs);
        let health = assess(cluster, jobs);
        Self {
            cluster,
            total_jobs: jobs.len(),
            held_pct: health.held_pct,
            avg_runtime_secs: analytics.avg_runtime_secs,
            mem_eff: analytics.mem_efficiency,
            cpu_eff: analytics.cpu_efficiency,
            disk_eff: analytics.disk_efficiency,
            score: health.score,
            grade: health.grade,
        }
    }
}

fn pct(v: Option<f64>) -> String {
    v.map(|p| format!("{:.1}%", p)).unwrap_or_else(|| "N/A".to_string())
}

fn runtime(v: Option<f64>) -> String {
    v.map(|s| format_seconds_human(s as u64))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Render the side-by-side comparison table.
pub fn render(a: &ClusterSnapshot, b: &ClusterSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", banner("HTCondor Cluster Comparison"));

    let mut builder = Builder::default();
    builder.push_record(vec![
        "Metric".to_string(),
        format!("Cluster {}", a.cluster),
        format!("Cluster {}", b.cluster),
    ]);
    builder.push_record(vec![
        "Job Count".to_string(),
        a.total_jobs.to_string(),
        b.total_jobs.to_string(),
    ]);
    builder.push_record(vec![
        "Held Jobs".to_string(),
        format!("{:.1}%", a.held_pct),
        format!("{:.1}%", b.held_pct),
    ]);
    builder.push_record(vec![
        "Avg Runtime".to_string(),
        runtime(a.avg_runtime_secs),
        runtime(b.avg_runtime_secs),
    ]);
    builder.push_record(vec![
        "Memory Efficiency".to_string(),
        pct(a.mem_eff),
        pct(b.mem_eff),
    ]);
    builder.push_record(vec![
        "CPU Efficiency".to_string(),
        pct(a.cpu_eff),
        pct(b.cpu_eff),
    ]);
    builder.push_record(vec![
        "Disk Efficiency".to_string(),
        pct(a.disk_eff),
        pct(b.disk_eff),
    ]);
    builder.push_record(vec![
        "Health".to_string(),
        format!("{}/100 ({})", a.score, a.grade),
        format!("{}/100 ({})", b.score, b.grade),
    ]);

    let mut table = builder.build();
    table.with(Style::ascii());
    let _ = writeln!(out, "{}", table);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(cluster: i64, proc: i64, wall: f64) -> JobRecord {
        JobRecord {
            cluster_id: cluster,
            proc_id: proc,
            job_status: Some(4),
            request_memory: Some(2048.0),
            resident_set_size: Some(1048576.0),
            remote_wall_clock: Some(wall),
            ..JobRecord::default()
        }
    }

    #[test]
    fn test_snapshot() {
        let jobs = vec![job(111, 0, 100.0), job(111, 1, 300.0)];
        let snap = ClusterSnapshot::from_jobs(111, &jobs);
        assert_eq!(snap.total_jobs, 2);
        assert_eq!(snap.avg_runtime_secs, Some(200.0));
        assert_eq!(snap.mem_eff, Some(50.0));
        assert_eq!(snap.held_pct, 0.0);
    }

    #[test]
    fn test_render_side_by_side() {
        let a = ClusterSnapshot::from_jobs(111, &[job(111, 0, 100.0)]);
        let b = ClusterSnapshot::from_jobs(222, &[job(222, 0, 500.0), job(222, 1, 700.0)]);
        let text = render(&a, &b);
        assert!(text.contains("Cluster 111"));
        assert!(text.contains("Cluster 222"));
        assert!(text.contains("Job Count"));
        assert!(text.contains("Health"));
    }
}
