//! The per-job ClassAd projection and its derived metrics.

use crate::status::JobStatus;
use serde::{Deserialize, Serialize};

/// Attributes projected from the schedd for every job, in the order they
/// appear as CSV columns. Resource usage attributes use the `_RAW` forms
/// so values arrive in KiB rather than rounded MiB.
pub const PROJECTION_ATTRS: [&str; 20] = [
    "ClusterId",
    "ProcId",
    "JobStatus",
    "RequestMemory",
    "RequestDisk",
    "RequestCpus",
    "RequestGpus",
    "ResidentSetSize_RAW",
    "DiskUsage_RAW",
    "RemoteUserCpu",
    "RemoteSysCpu",
    "RemoteWallClockTime",
    "CpusProvisioned",
    "HoldReason",
    "HoldReasonCode",
    "HoldReasonSubCode",
    "EnteredCurrentStatus",
    "QDate",
    "CompletionDate",
    "JobStartDate",
];

/// One job's fetched attributes.
///
/// Everything beyond the identifiers is optional: history ads routinely
/// omit attributes, and queue ads omit completion data. Serde names match
/// the ClassAd attribute names so the CSV cache header is the projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "ClusterId")]
    pub cluster_id: i64,
    #[serde(rename = "ProcId")]
    pub proc_id: i64,
    #[serde(rename = "JobStatus")]
    pub job_status: Option<i64>,
    /// Requested memory, MiB.
    #[serde(rename = "RequestMemory")]
    pub request_memory: Option<f64>,
    /// Requested disk, KiB.
    #[serde(rename = "RequestDisk")]
    pub request_disk: Option<f64>,
    #[serde(rename = "RequestCpus")]
    pub request_cpus: Option<f64>,
    #[serde(rename = "RequestGpus")]
    pub request_gpus: Option<f64>,
    /// Peak resident set size, KiB.
    #[serde(rename = "ResidentSetSize_RAW")]
    pub resident_set_size: Option<f64>,
    /// Peak disk usage, KiB.
    #[serde(rename = "DiskUsage_RAW")]
    pub disk_usage: Option<f64>,
    /// User-mode CPU seconds.
    #[serde(rename = "RemoteUserCpu")]
    pub remote_user_cpu: Option<f64>,
    /// System-mode CPU seconds.
    #[serde(rename = "RemoteSysCpu")]
    pub remote_sys_cpu: Option<f64>,
    /// Wall clock seconds accumulated while running.
    #[serde(rename = "RemoteWallClockTime")]
    pub remote_wall_clock: Option<f64>,
    #[serde(rename = "CpusProvisioned")]
    pub cpus_provisioned: Option<f64>,
    #[serde(rename = "HoldReason")]
    pub hold_reason: Option<String>,
    #[serde(rename = "HoldReasonCode")]
    pub hold_reason_code: Option<i64>,
    #[serde(rename = "HoldReasonSubCode")]
    pub hold_reason_subcode: Option<i64>,
    /// Epoch seconds when the job entered its current status.
    #[serde(rename = "EnteredCurrentStatus")]
    pub entered_current_status: Option<i64>,
    /// Submission time, epoch seconds.
    #[serde(rename = "QDate")]
    pub q_date: Option<i64>,
    /// Completion time, epoch seconds.
    #[serde(rename = "CompletionDate")]
    pub completion_date: Option<i64>,
    /// Most recent start time, epoch seconds.
    #[serde(rename = "JobStartDate")]
    pub job_start_date: Option<i64>,
}

impl JobRecord {
    /// Full job id in the `cluster.proc` form used by the condor tools.
    pub fn job_id(&self) -> String {
        format!("{}.{}", self.cluster_id, self.proc_id)
    }

    pub fn status(&self) -> Option<JobStatus> {
        self.job_status.map(JobStatus::from_code)
    }

    pub fn is_held(&self) -> bool {
        self.status() == Some(JobStatus::Held)
    }

    /// Requested memory in GiB (RequestMemory is MiB).
    pub fn mem_requested_gib(&self) -> Option<f64> {
        positive(self.request_memory).map(|v| v / 1024.0)
    }

    /// Peak memory used in GiB (ResidentSetSize_RAW is KiB).
    pub fn mem_used_gib(&self) -> Option<f64> {
        positive(self.resident_set_size).map(|v| v / 1024.0 / 1024.0)
    }

    /// Requested disk in GiB (RequestDisk is KiB).
    pub fn disk_requested_gib(&self) -> Option<f64> {
        positive(self.request_disk).map(|v| v / (1024.0 * 1024.0))
    }

    /// Peak disk used in GiB (DiskUsage_RAW is KiB).
    pub fn disk_used_gib(&self) -> Option<f64> {
        positive(self.disk_usage).map(|v| v / (1024.0 * 1024.0))
    }

    /// Wall clock runtime in seconds, when the job accumulated any.
    pub fn runtime_secs(&self) -> Option<f64> {
        positive(self.remote_wall_clock)
    }

    /// Per-job CPU efficiency percentage.
    ///
    /// System CPU seconds spread over the requested CPUs, as a fraction of
    /// wall clock time. Requires a positive runtime, a CPU request, and
    /// some recorded CPU time.
    pub fn cpu_efficiency_pct(&self) -> Option<f64> {
        let wall = positive(self.remote_wall_clock)?;
        let cpus = positive(self.request_cpus)?;
        let user = self.remote_user_cpu.unwrap_or(0.0);
        let sys = self.remote_sys_cpu.unwrap_or(0.0);
        if user <= 0.0 && sys <= 0.0 {
            return None;
        }
        Some((sys / cpus) / wall * 100.0)
    }

    /// Per-job memory efficiency percentage (used / requested).
    pub fn mem_efficiency_pct(&self) -> Option<f64> {
        Some(self.mem_used_gib()? / self.mem_requested_gib()? * 100.0)
    }

    /// Per-job disk efficiency percentage (used / requested).
    pub fn disk_efficiency_pct(&self) -> Option<f64> {
        Some(self.disk_used_gib()? / self.disk_requested_gib()? * 100.0)
    }
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| *x > 0.0)
}

/// A held job as returned by the live held-jobs query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldJob {
    pub proc_id: i64,
    pub code: i64,
    pub subcode: i64,
    /// Hold reason, normalized to its first sentence.
    pub reason: String,
    /// Epoch seconds when the job was held (EnteredCurrentStatus), 0 when absent.
    pub entered: i64,
}
