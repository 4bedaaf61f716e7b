//! Schedd interface: query HTCondor job data via the condor client tools.
//!
//! Queries go through `condor_q` (the live queue) and `condor_history`
//! (finished jobs), both invoked with a `ClusterId` constraint and an
//! `-af:tV` attribute projection.

pub mod held;
pub mod schedd;

pub use held::{normalize_hold_reason, query_held_jobs};
pub use schedd::{
    fetch_cluster_jobs, status_counts, validate_cluster_exists, FetchOutcome, QuerySource,
};

use roost_parsers::CommandError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CondorError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Failed to parse {tool} output: {detail}")]
    Parse { tool: String, detail: String },
    #[error("No jobs found for cluster {0}")]
    NoJobs(u64),
}
