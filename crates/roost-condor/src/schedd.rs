//! Queue and history queries for a cluster.

use crate::CondorError;
use roost_core::{JobRecord, PROJECTION_ATTRS};
use roost_parsers::{parse_f64, parse_i64, run_command, run_command_allow_failure, split_autoformat};
use std::collections::BTreeMap;
use tokio::process::Command;

/// Which side of the schedd a query reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    /// `condor_q`: idle, running, and held jobs.
    Queue,
    /// `condor_history`: completed and removed jobs.
    History,
}

impl QuerySource {
    pub fn tool(&self) -> &'static str {
        match self {
            QuerySource::Queue => "condor_q",
            QuerySource::History => "condor_history",
        }
    }
}

fn query_cmd(source: QuerySource, constraint: &str, attrs: &[&str]) -> Command {
    let mut cmd = Command::new(source.tool());
    cmd.args(["-constraint", constraint, "-af:tV"]);
    cmd.args(attrs);
    cmd
}

/// Parse one `-af:tV` line into a job record.
///
/// Field order is [`PROJECTION_ATTRS`].
fn parse_job_line(source: QuerySource, line: &str) -> Result<JobRecord, CondorError> {
    let fields = split_autoformat(line);
    if fields.len() < PROJECTION_ATTRS.len() {
        return Err(CondorError::Parse {
            tool: source.tool().to_string(),
            detail: format!(
                "expected {} fields, got {}: {}",
                PROJECTION_ATTRS.len(),
                fields.len(),
                line
            ),
        });
    }
    let get = |i: usize| fields[i].as_deref();

    let cluster_id = parse_i64(get(0)).ok_or_else(|| CondorError::Parse {
        tool: source.tool().to_string(),
        detail: format!("missing ClusterId: {}", line),
    })?;
    let proc_id = parse_i64(get(1)).ok_or_else(|| CondorError::Parse {
        tool: source.tool().to_string(),
        detail: format!("missing ProcId: {}", line),
    })?;

    Ok(JobRecord {
        cluster_id,
        proc_id,
        job_status: parse_i64(get(2)),
        request_memory: parse_f64(get(3)),
        request_disk: parse_f64(get(4)),
        request_cpus: parse_f64(get(5)),
        request_gpus: parse_f64(get(6)),
        resident_set_size: parse_f64(get(7)),
        disk_usage: parse_f64(get(8)),
        remote_user_cpu: parse_f64(get(9)),
        remote_sys_cpu: parse_f64(get(10)),
        remote_wall_clock: parse_f64(get(11)),
        cpus_provisioned: parse_f64(get(12)),
        hold_reason: fields[13].clone(),
        hold_reason_code: parse_i64(get(14)),
        hold_reason_subcode: parse_i64(get(15)),
        entered_current_status: parse_i64(get(16)),
        q_date: parse_i64(get(17)),
        completion_date: parse_i64(get(18)),
        job_start_date: parse_i64(get(19)),
    })
}

fn parse_job_lines(source: QuerySource, stdout: &str) -> Vec<JobRecord> {
    let mut jobs = Vec::new();
    for line in stdout.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_job_line(source, line) {
            Ok(job) => jobs.push(job),
            Err(e) => tracing::warn!("Skipping unparseable {} line: {}", source.tool(), e),
        }
    }
    jobs
}

/// Query one source for every job in a cluster with the full projection.
pub async fn query_source(
    cluster: u64,
    source: QuerySource,
) -> Result<Vec<JobRecord>, CondorError> {
    let constraint = format!("ClusterId == {}", cluster);
    let mut cmd = query_cmd(source, &constraint, &PROJECTION_ATTRS);
    let stdout = run_command(&mut cmd, source.tool()).await?;
    Ok(parse_job_lines(source, &stdout))
}

/// Result of a full cluster fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub jobs: Vec<JobRecord>,
    pub history_count: usize,
    pub queue_count: usize,
}

/// Fetch all jobs for a cluster: history first, then the live queue.
///
/// A failure on one side is downgraded to a warning so a rotated history
/// file or a drained queue doesn't lose the other side's data; finding
/// nothing at all is an error.
pub async fn fetch_cluster_jobs(cluster: u64) -> Result<FetchOutcome, CondorError> {
    let mut jobs = Vec::new();

    let history_count = match query_source(cluster, QuerySource::History).await {
        Ok(mut history) => {
            let n = history.len();
            jobs.append(&mut history);
            n
        }
        Err(e) => {
            tracing::warn!("Error querying history: {}", e);
            0
        }
    };

    let queue_count = match query_source(cluster, QuerySource::Queue).await {
        Ok(mut queue) => {
            let n = queue.len();
            jobs.append(&mut queue);
            n
        }
        Err(e) => {
            tracing::warn!("Error querying queue: {}", e);
            0
        }
    };

    if jobs.is_empty() {
        return Err(CondorError::NoJobs(cluster));
    }

    Ok(FetchOutcome {
        jobs,
        history_count,
        queue_count,
    })
}

/// Quick existence probe before a full fetch: one ad from history, then
/// one from the queue. Tool failures count as "not found".
pub async fn validate_cluster_exists(cluster: u64) -> bool {
    let constraint = format!("ClusterId == {}", cluster);

    let mut cmd = Command::new("condor_history");
    cmd.args([
        "-constraint",
        constraint.as_str(),
        "-limit",
        "1",
        "-af:tV",
        "ClusterId",
    ]);
    if let Ok(stdout) = run_command(&mut cmd, "condor_history").await {
        if stdout.lines().any(|l| !l.trim().is_empty()) {
            return true;
        }
    }

    let mut cmd = query_cmd(QuerySource::Queue, &constraint, &["ClusterId"]);
    match run_command(&mut cmd, "condor_q").await {
        Ok(stdout) => stdout.lines().any(|l| !l.trim().is_empty()),
        Err(_) => false,
    }
}

fn count_statuses(stdout: &str, counts: &mut BTreeMap<i64, usize>) {
    for line in stdout.lines() {
        let fields = split_autoformat(line);
        if let Some(code) = parse_i64(fields.first().and_then(|f| f.as_deref())) {
            *counts.entry(code).or_insert(0) += 1;
        }
    }
}

/// Live per-status job counts across history and queue.
///
/// Only `JobStatus` is projected, so this stays cheap on large clusters.
pub async fn status_counts(cluster: u64) -> Result<BTreeMap<i64, usize>, CondorError> {
    let constraint = format!("ClusterId == {}", cluster);
    let mut counts = BTreeMap::new();

    for source in [QuerySource::History, QuerySource::Queue] {
        let mut cmd = query_cmd(source, &constraint, &["JobStatus"]);
        // History may exit non-zero mid-rotation; take what we get.
        let stdout = match source {
            QuerySource::History => run_command_allow_failure(&mut cmd, source.tool()).await?,
            QuerySource::Queue => run_command(&mut cmd, source.tool()).await?,
        };
        count_statuses(&stdout, &mut counts);
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_for(values: [&str; 20]) -> String {
        values.join("\t")
    }

    #[test]
    fn test_parse_job_line_full() {
        let line = line_for([
            "4641492",
            "7",
            "4",
            "4096",
            "10485760",
            "4",
            "undefined",
            "1048576",
            "2097152",
            "100.0",
            "2000.0",
            "1000.0",
            "4",
            "undefined",
            "undefined",
            "undefined",
            "1718000000",
            "1717990000",
            "1718001000",
            "1717995000",
        ]);
        let job = parse_job_line(QuerySource::History, &line).unwrap();
        assert_eq!(job.cluster_id, 4641492);
        assert_eq!(job.proc_id, 7);
        assert_eq!(job.job_status, Some(4));
        assert_eq!(job.request_gpus, None);
        assert_eq!(job.remote_wall_clock, Some(1000.0));
        assert_eq!(job.q_date, Some(1717990000));
    }

    #[test]
    fn test_parse_job_line_held() {
        let line = line_for([
            "100",
            "2",
            "5",
            "2048",
            "undefined",
            "1",
            "undefined",
            "undefined",
            "undefined",
            "undefined",
            "undefined",
            "undefined",
            "undefined",
            "\"Error from slot1@node01: memory usage exceeded request_memory.\"",
            "34",
            "0",
            "1718000000",
            "1717990000",
            "undefined",
            "undefined",
        ]);
        let job = parse_job_line(QuerySource::Queue, &line).unwrap();
        assert!(job.is_held());
        assert_eq!(job.hold_reason_code, Some(34));
        assert_eq!(
            job.hold_reason.as_deref(),
            Some("Error from slot1@node01: memory usage exceeded request_memory.")
        );
    }

    #[test]
    fn test_parse_job_line_short() {
        assert!(parse_job_line(QuerySource::Queue, "1\t2\t3").is_err());
    }

    #[test]
    fn test_parse_job_lines_skips_garbage() {
        let good = line_for([
            "1", "0", "2", "undefined", "undefined", "undefined", "undefined", "undefined",
            "undefined", "undefined", "undefined", "undefined", "undefined", "undefined",
            "undefined", "undefined", "undefined", "undefined", "undefined", "undefined",
        ]);
        let stdout = format!("{}\nnot a job line\n\n", good);
        let jobs = parse_job_lines(QuerySource::Queue, &stdout);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_id(), "1.0");
    }

    #[test]
    fn test_count_statuses() {
        let mut counts = BTreeMap::new();
        count_statuses("4\n4\n5\n2\n", &mut counts);
        count_statuses("1\n4\n", &mut counts);
        assert_eq!(counts.get(&4), Some(&3));
        assert_eq!(counts.get(&5), Some(&1));
        assert_eq!(counts.get(&2), Some(&1));
        assert_eq!(counts.get(&1), Some(&1));
    }
}
