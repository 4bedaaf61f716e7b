//! Resource request/usage analytics for a cluster.

use crate::render::{self, bar, banner, section, trim_float};
use crate::stats;
use roost_core::JobRecord;
use roost_parsers::format_seconds_human;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Per-resource sample vectors extracted from the job records.
///
/// Requested values are in GiB (rounded to two decimals so identical
/// requests group together in the tables); usage values are raw GiB.
#[derive(Debug, Default)]
pub struct ResourceSamples {
    pub mem_requested: Vec<f64>,
    pub mem_used: Vec<f64>,
    pub disk_requested: Vec<f64>,
    pub disk_used: Vec<f64>,
    pub cpu_requests: Vec<i64>,
    pub gpu_requests: Vec<i64>,
    pub mem_eff: Vec<f64>,
    pub disk_eff: Vec<f64>,
    pub cpu_eff: Vec<f64>,
    pub runtimes: Vec<f64>,
}

impl ResourceSamples {
    pub fn collect(jobs: &[JobRecord]) -> Self {
        let mut s = ResourceSamples::default();
        for job in jobs {
            if let Some(v) = job.mem_requested_gib() {
                s.mem_requested.push(round2(v));
            }
            if let Some(v) = job.mem_used_gib() {
                s.mem_used.push(v);
            }
            if let Some(v) = job.disk_requested_gib() {
                s.disk_requested.push(round2(v));
            }
            if let Some(v) = job.disk_used_gib() {
                s.disk_used.push(v);
            }
            if let Some(v) = job.request_cpus.filter(|v| *v > 0.0) {
                s.cpu_requests.push(v as i64);
            }
            if let Some(v) = job.request_gpus.filter(|v| *v > 0.0) {
                s.gpu_requests.push(v as i64);
            }
            if let Some(e) = job.mem_efficiency_pct() {
                s.mem_eff.push(e);
            }
            if let Some(e) = job.disk_efficiency_pct() {
                s.disk_eff.push(e);
            }
            if let Some(e) = job.cpu_efficiency_pct() {
                s.cpu_eff.push(e);
            }
            if let Some(rt) = job.runtime_secs() {
                s.runtimes.push(rt);
            }
        }
        s
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// A right-sizing recommendation for memory or disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Median requested, GiB.
    pub current: f64,
    /// P95 of actual usage plus buffer, GiB.
    pub recommended: f64,
    pub savings_gib_hours: f64,
    pub jobs_affected: usize,
}

/// CPU right-sizing recommendation, emitted when median efficiency < 50%.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuRecommendation {
    pub current: f64,
    pub current_efficiency: f64,
    pub recommended: u64,
    pub jobs_affected: usize,
}

/// Headline analytics for a cluster, shared by the health, dashboard, and
/// compare reports.
#[derive(Debug, Clone)]
pub struct ClusterAnalytics {
    pub total_jobs: usize,
    pub avg_runtime_secs: Option<f64>,
    /// Median per-job efficiencies; None when no job had both a request
    /// and a usage sample for the resource.
    pub mem_efficiency: Option<f64>,
    pub disk_efficiency: Option<f64>,
    pub cpu_efficiency: Option<f64>,
    pub mem_jobs: usize,
    pub disk_jobs: usize,
    pub cpu_jobs: usize,
    pub memory_rec: Option<Recommendation>,
    pub disk_rec: Option<Recommendation>,
    pub cpu_rec: Option<CpuRecommendation>,
}

impl ClusterAnalytics {
    pub fn avg_runtime_hours(&self) -> f64 {
        match self.avg_runtime_secs {
            Some(s) => s / 3600.0,
            None => 1.0,
        }
    }
}

/// Compute cluster analytics from job records.
pub fn analyze(jobs: &[JobRecord]) -> ClusterAnalytics {
    let samples = ResourceSamples::collect(jobs);
    analyze_samples(jobs.len(), &samples)
}

fn analyze_samples(total_jobs: usize, s: &ResourceSamples) -> ClusterAnalytics {
    let avg_runtime_secs = stats::mean(&s.runtimes);
    let avg_runtime_hours = avg_runtime_secs.map(|v| v / 3600.0).unwrap_or(1.0);

    let memory_rec = sizing_recommendation(&s.mem_requested, &s.mem_used, 1.1, avg_runtime_hours);
    let disk_rec = sizing_recommendation(&s.disk_requested, &s.disk_used, 1.2, avg_runtime_hours);

    let cpu_efficiency = stats::median(&s.cpu_eff);
    let cpu_rec = match (cpu_efficiency, stats::median_i64(&s.cpu_requests)) {
        (Some(eff), Some(req)) if eff < 50.0 => Some(CpuRecommendation {
            current: req,
            current_efficiency: eff,
            recommended: ((req * (eff / 100.0) * 1.2) as u64).max(1),
            jobs_affected: s.cpu_eff.len(),
        }),
        _ => None,
    };

    ClusterAnalytics {
        total_jobs,
        avg_runtime_secs,
        mem_efficiency: stats::median(&s.mem_eff),
        disk_efficiency: stats::median(&s.disk_eff),
        cpu_efficiency,
        mem_jobs: s.mem_eff.len(),
        disk_jobs: s.disk_eff.len(),
        cpu_jobs: s.cpu_eff.len(),
        memory_rec,
        disk_rec,
        cpu_rec,
    }
}

/// P95-plus-buffer recommendation; only emitted when it would cut the
/// median request by at least 20%.
fn sizing_recommendation(
    requested: &[f64],
    used: &[f64],
    buffer: f64,
    avg_runtime_hours: f64,
) -> Option<Recommendation> {
    if requested.is_empty() || used.is_empty() {
        return None;
    }
    let recommended = stats::percentile(used, 95.0)? * buffer;
    let current = stats::median(requested)?;
    if recommended >= current * 0.8 {
        return None;
    }
    Some(Recommendation {
        current,
        recommended,
        savings_gib_hours: (current - recommended) * used.len() as f64 * avg_runtime_hours,
        jobs_affected: used.len(),
    })
}

/// Render the full analytics report.
pub fn report(cluster: u64, jobs: &[JobRecord]) -> String {
    let samples = ResourceSamples::collect(jobs);
    let analytics = analyze_samples(jobs.len(), &samples);
    let mut out = String::new();

    let _ = writeln!(out, "{}", banner("HTCondor Cluster Resource Summary"));
    let _ = writeln!(out, "{:>20}: {}", "Cluster ID", cluster);
    let _ = writeln!(out, "{:>20}: {}", "Job Count", analytics.total_jobs);
    let avg_runtime = match analytics.avg_runtime_secs {
        Some(s) => format_seconds_human(s as u64),
        None => "N/A".to_string(),
    };
    let _ = writeln!(out, "{:>20}: {}\n", "Avg Runtime", avg_runtime);

    let _ = writeln!(out, "{}", section("Requested Resources"));
    out.push_str(&resource_table_f64("Memory (GiB)", &samples.mem_requested, "GiB"));
    out.push_str(&resource_table_f64("Disk (GiB)", &samples.disk_requested, "GiB"));
    out.push_str(&resource_table_i64("CPUs", &samples.cpu_requests));
    out.push_str(&resource_table_i64("GPUs", &samples.gpu_requests));

    let _ = writeln!(out, "{}", section("Number Summary Table"));
    let _ = writeln!(
        out,
        "{:<25}: {:>6}  {:>6}  {:>7}  {:>6}  {:>6}   {:>6}",
        "Resource (units)", "Min", "Q1", "Median", "Q3", "Max", "StdDev"
    );
    let _ = writeln!(out, "{}", "-".repeat(render::LINE_WIDTH));
    let _ = writeln!(out, "{}", usage_summary("Memory Used (GiB)", &samples.mem_used, false));
    let _ = writeln!(out, "{}", usage_summary("Disk Used (GiB)", &samples.disk_used, false));
    let _ = writeln!(out, "{}", usage_summary("CPU Usage (%)", &samples.cpu_eff, true));
    out.push('\n');

    let _ = writeln!(out, "{}", section("Overall Utilization"));
    let mem_eff = analytics.mem_efficiency.unwrap_or(0.0);
    let disk_eff = analytics.disk_efficiency.unwrap_or(0.0);
    let cpu_eff = analytics.cpu_efficiency.unwrap_or(0.0);
    let _ = writeln!(out, "  Memory usage      {}", bar(mem_eff, 50));
    let _ = writeln!(out, "  Disk usage        {}", bar(disk_eff, 50));
    let _ = writeln!(out, "  CPU usage         {}\n", bar(cpu_eff, 50));

    let _ = writeln!(out, "{}", section("Resource Usage Distribution"));
    out.push_str(&usage_distribution("Memory", &samples.mem_used, "GiB"));
    out.push_str(&usage_distribution("Disk", &samples.disk_used, "GiB"));

    out.push_str(&recommendations(&analytics));

    let _ = writeln!(out, "\n{}", section("Efficiency Summary"));
    out.push_str(&efficiency_warning("Memory", analytics.mem_efficiency));
    out.push_str(&efficiency_warning("Disk", analytics.disk_efficiency));
    out.push_str(&efficiency_warning("CPU", analytics.cpu_efficiency));

    let _ = writeln!(out, "\n{}", section("End of Summary"));
    out
}

/// Distinct request values with job counts.
fn resource_table_f64(name: &str, values: &[f64], unit: &str) -> String {
    if values.is_empty() {
        return format!("{:<15}: No data\n", name);
    }
    // keys in hundredths so equal requests group after rounding
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for v in values {
        *counts.entry((v * 100.0).round() as i64).or_insert(0) += 1;
    }
    let mut out = format!("{:<15}:\n", name);
    for (key, count) in counts {
        let _ = writeln!(
            out,
            "{:<15}  {:<10} {:<5}  {} job(s)",
            "",
            trim_float(key as f64 / 100.0),
            unit,
            count
        );
    }
    out.push('\n');
    out
}

fn resource_table_i64(name: &str, values: &[i64]) -> String {
    if values.is_empty() {
        return format!("{:<15}: No data\n", name);
    }
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(*v).or_insert(0) += 1;
    }
    let mut out = format!("{:<15}:\n", name);
    for (value, count) in counts {
        let _ = writeln!(out, "{:<15}  {:<10} {:<5}  {} job(s)", "", value, "", count);
    }
    out.push('\n');
    out
}

/// Five-number summary plus standard deviation, one line.
fn usage_summary(label: &str, data: &[f64], percentage: bool) -> String {
    let (Some(q), Some(sd)) = (stats::quartiles(data), stats::stdev(data)) else {
        return format!("{:<25}: Not enough data", label);
    };
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let fmt = |v: f64| {
        if percentage {
            format!("{:.1}%", v)
        } else {
            format!("{:.1}", v)
        }
    };
    format!(
        "{:<25}: {:>6}  {:>6}  {:>7}  {:>6}  {:>6}   {:>6}",
        label,
        fmt(sorted[0]),
        fmt(q[0]),
        fmt(q[1]),
        fmt(q[2]),
        fmt(sorted[sorted.len() - 1]),
        fmt(sd)
    )
}

/// Pick distribution bins from the data range.
fn distribution_bins(max_val: f64) -> (Vec<f64>, Vec<&'static str>) {
    if max_val <= 10.0 {
        (
            vec![0.0, 2.0, 5.0, 10.0, f64::INFINITY],
            vec!["0-2", "2-5", "5-10", "10+"],
        )
    } else if max_val <= 50.0 {
        (
            vec![0.0, 5.0, 10.0, 20.0, 50.0, f64::INFINITY],
            vec!["0-5", "5-10", "10-20", "20-50", "50+"],
        )
    } else {
        (
            vec![0.0, 10.0, 25.0, 50.0, 100.0, f64::INFINITY],
            vec!["0-10", "10-25", "25-50", "50-100", "100+"],
        )
    }
}

/// Histogram of jobs by actual usage.
fn usage_distribution(name: &str, used: &[f64], unit: &str) -> String {
    if used.is_empty() {
        return String::new();
    }
    let max_val = used.iter().cloned().fold(f64::MIN, f64::max);
    let (bins, labels) = distribution_bins(max_val);

    let mut counts = vec![0usize; labels.len()];
    for val in used {
        for i in 0..bins.len() - 1 {
            if *val >= bins[i] && *val < bins[i + 1] {
                counts[i] += 1;
                break;
            }
        }
    }

    let total = used.len();
    let max_count = counts.iter().copied().max().unwrap_or(1).max(1);
    let bar_width = 50;

    let mut out = format!("\n{} Distribution:\n", name);
    for (label, count) in labels.iter().zip(&counts) {
        let pct = *count as f64 / total as f64 * 100.0;
        let fill = "█".repeat(count * bar_width / max_count);
        let _ = writeln!(
            out,
            "  {:>10} {}: {:<bar_width$} {:>4} ({:>5.1}%)",
            label, unit, fill, count, pct
        );
    }
    out
}

fn recommendations(a: &ClusterAnalytics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", section("Resource Optimization Recommendations"));

    if let Some(rec) = &a.memory_rec {
        let _ = writeln!(out, "\n📊 Memory:");
        let _ = writeln!(out, "  Current Request     : {:.1} GiB", rec.current);
        let _ = writeln!(
            out,
            "  Recommended         : {:.1} GiB (P95 + 10% buffer)",
            rec.recommended
        );
        let _ = writeln!(
            out,
            "  Potential Savings   : {:.1} GiB-hours",
            rec.savings_gib_hours
        );
        let _ = writeln!(out, "  Jobs Affected       : {}", rec.jobs_affected);
    }

    if let Some(rec) = &a.disk_rec {
        let _ = writeln!(out, "\n💾 Disk:");
        let _ = writeln!(out, "  Current Request     : {:.1} GiB", rec.current);
        let _ = writeln!(
            out,
            "  Recommended         : {:.1} GiB (P95 + 20% buffer)",
            rec.recommended
        );
        let _ = writeln!(
            out,
            "  Potential Savings   : {:.1} GiB-hours",
            rec.savings_gib_hours
        );
        let _ = writeln!(out, "  Jobs Affected       : {}", rec.jobs_affected);
    }

    if let Some(rec) = &a.cpu_rec {
        let _ = writeln!(out, "\n⚙️  CPU:");
        let _ = writeln!(out, "  Current Request     : {:.1} CPUs", rec.current);
        let _ = writeln!(
            out,
            "  Current Efficiency  : {:.1}%",
            rec.current_efficiency
        );
        let _ = writeln!(out, "  Recommended         : {} CPUs", rec.recommended);
        let _ = writeln!(out, "  Jobs Affected       : {}", rec.jobs_affected);
    }

    if a.memory_rec.is_none() && a.disk_rec.is_none() && a.cpu_rec.is_none() {
        let _ = writeln!(out, "\n  Requests look proportionate to observed usage.");
    }
    out
}

fn efficiency_warning(resource: &str, efficiency: Option<f64>) -> String {
    let Some(eff) = efficiency else {
        return format!("  -  {} usage: no data\n", resource);
    };
    if eff < 15.0 {
        format!(
            "  ⚠️  {} usage is {:.1}% - significant over-provisioning\n",
            resource, eff
        )
    } else if eff < 50.0 {
        format!(
            "  ⚠️  {} usage is {:.1}% - consider reducing requests\n",
            resource, eff
        )
    } else if eff > 80.0 {
        format!("  ✅ {} usage is {:.1}% - well optimized\n", resource, eff)
    } else {
        format!("  ✅ {} usage is {:.1}%\n", resource, eff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(mem_req_mib: f64, mem_used_kib: f64, wall: f64) -> JobRecord {
        JobRecord {
            cluster_id: 1,
            proc_id: 0,
            job_status: Some(4),
            request_memory: Some(mem_req_mib),
            resident_set_size: Some(mem_used_kib),
            request_cpus: Some(2.0),
            remote_sys_cpu: Some(wall), // 50% cpu efficiency on 2 cpus
            remote_wall_clock: Some(wall),
            ..JobRecord::default()
        }
    }

    #[test]
    fn test_collect_units() {
        let jobs = vec![job(4096.0, 1048576.0, 100.0)];
        let s = ResourceSamples::collect(&jobs);
        assert_eq!(s.mem_requested, vec![4.0]);
        assert_eq!(s.mem_used, vec![1.0]);
        assert_eq!(s.mem_eff, vec![25.0]);
        assert_eq!(s.cpu_eff, vec![50.0]);
        assert_eq!(s.runtimes, vec![100.0]);
    }

    #[test]
    fn test_analyze_medians() {
        let jobs = vec![
            job(4096.0, 1048576.0, 100.0),  // 25% mem eff
            job(4096.0, 3145728.0, 300.0),  // 75% mem eff
        ];
        let a = analyze(&jobs);
        assert_eq!(a.total_jobs, 2);
        assert_eq!(a.mem_efficiency, Some(50.0));
        assert_eq!(a.cpu_efficiency, Some(50.0));
        assert_eq!(a.avg_runtime_secs, Some(200.0));
        assert_eq!(a.mem_jobs, 2);
    }

    #[test]
    fn test_memory_recommendation_fires_on_waste() {
        // request 64 GiB, use ~1 GiB
        let jobs: Vec<JobRecord> = (0..10)
            .map(|i| {
                let mut j = job(65536.0, 1048576.0, 3600.0);
                j.proc_id = i;
                j
            })
            .collect();
        let a = analyze(&jobs);
        let rec = a.memory_rec.expect("expected a memory recommendation");
        assert_eq!(rec.current, 64.0);
        assert!((rec.recommended - 1.1).abs() < 1e-6);
        assert_eq!(rec.jobs_affected, 10);
        assert!(rec.savings_gib_hours > 0.0);
    }

    #[test]
    fn test_no_recommendation_when_well_sized() {
        // request 1 GiB, use ~0.9 GiB
        let jobs = vec![job(1024.0, 943718.0, 100.0)];
        let a = analyze(&jobs);
        assert!(a.memory_rec.is_none());
    }

    #[test]
    fn test_cpu_recommendation_threshold() {
        let mut low = job(1024.0, 524288.0, 1000.0);
        low.remote_sys_cpu = Some(200.0); // (200/2)/1000 = 10%
        let a = analyze(&[low]);
        let rec = a.cpu_rec.expect("expected a cpu recommendation");
        assert_eq!(rec.recommended, 1);
        assert!((rec.current_efficiency - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_sections_present() {
        let jobs = vec![job(4096.0, 1048576.0, 100.0), job(2048.0, 524288.0, 50.0)];
        let text = report(12345, &jobs);
        assert!(text.contains("HTCondor Cluster Resource Summary"));
        assert!(text.contains("Requested Resources"));
        assert!(text.contains("Number Summary Table"));
        assert!(text.contains("Overall Utilization"));
        assert!(text.contains("Memory Distribution:"));
        assert!(text.contains("Efficiency Summary"));
        assert!(text.contains("12345"));
    }

    #[test]
    fn test_usage_summary_needs_two_points() {
        assert!(usage_summary("X", &[1.0], false).contains("Not enough data"));
        let line = usage_summary("X", &[1.0, 2.0, 3.0, 4.0], false);
        assert!(line.contains("2.5"));
    }

    #[test]
    fn test_distribution_bins_by_range() {
        assert_eq!(distribution_bins(8.0).1.len(), 4);
        assert_eq!(distribution_bins(40.0).1.len(), 5);
        assert_eq!(distribution_bins(200.0).1[4], "100+");
    }
}
