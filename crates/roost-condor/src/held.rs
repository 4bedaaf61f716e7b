//! Held-job queries.

use crate::CondorError;
use roost_core::HeldJob;
use roost_parsers::{parse_i64, run_command, split_autoformat};
use tokio::process::Command;

const HELD_ATTRS: [&str; 5] = [
    "ProcId",
    "HoldReasonCode",
    "HoldReason",
    "HoldReasonSubCode",
    "EnteredCurrentStatus",
];

/// Normalize a raw HoldReason for bucketing.
///
/// Keeps only the first sentence, and strips the `Error from <slot>: `
/// prefix so messages differing only in the reporting slot group together.
pub fn normalize_hold_reason(raw: &str) -> String {
    let first = raw.split(". ").next().unwrap_or(raw);
    if first.contains("Error from") {
        if let Some((_, rest)) = first.split_once(": ") {
            return rest.to_string();
        }
    }
    first.to_string()
}

fn parse_held_line(line: &str) -> Option<HeldJob> {
    let fields = split_autoformat(line);
    if fields.len() < HELD_ATTRS.len() {
        return None;
    }
    let get = |i: usize| fields[i].as_deref();
    Some(HeldJob {
        proc_id: parse_i64(get(0))?,
        code: parse_i64(get(1)).unwrap_or(0),
        subcode: parse_i64(get(3)).unwrap_or(0),
        reason: normalize_hold_reason(get(2).unwrap_or("")),
        entered: parse_i64(get(4)).unwrap_or(0),
    })
}

/// Query the live queue for a cluster's held jobs.
pub async fn query_held_jobs(cluster: u64) -> Result<Vec<HeldJob>, CondorError> {
    let constraint = format!("ClusterId == {} && JobStatus == 5", cluster);
    let mut cmd = Command::new("condor_q");
    cmd.args(["-constraint", constraint.as_str(), "-af:tV"]);
    cmd.args(HELD_ATTRS);

    let stdout = run_command(&mut cmd, "condor_q").await?;

    let mut held = Vec::new();
    for line in stdout.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_held_line(line) {
            Some(job) => held.push(job),
            None => tracing::warn!("Skipping unparseable held-job line: {}", line),
        }
    }
    Ok(held)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_slot_prefix() {
        let raw = "Error from slot1_4@exec-23.example.edu: memory usage exceeded request_memory.";
        assert_eq!(
            normalize_hold_reason(raw),
            "memory usage exceeded request_memory."
        );
    }

    #[test]
    fn test_normalize_first_sentence_only() {
        let raw = "Transfer input files failure. Details: file not found";
        assert_eq!(normalize_hold_reason(raw), "Transfer input files failure");
    }

    #[test]
    fn test_normalize_plain_reason() {
        assert_eq!(
            normalize_hold_reason("via condor_hold (by user alice)"),
            "via condor_hold (by user alice)"
        );
    }

    #[test]
    fn test_parse_held_line() {
        let line = "12\t34\t\"Error from slot1@n1: memory usage exceeded request_memory.\"\t0\t1718000000";
        let job = parse_held_line(line).unwrap();
        assert_eq!(job.proc_id, 12);
        assert_eq!(job.code, 34);
        assert_eq!(job.subcode, 0);
        assert_eq!(job.reason, "memory usage exceeded request_memory.");
        assert_eq!(job.entered, 1718000000);
    }

    #[test]
    fn test_parse_held_line_missing_proc() {
        assert!(parse_held_line("undefined\t1\t\"x\"\t0\t0").is_none());
    }
}
