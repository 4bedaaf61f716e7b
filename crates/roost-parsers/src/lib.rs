//! Shared parsing utilities for HTCondor command output.
//!
//! This crate provides the pieces common to querying the condor client
//! tools: subprocess execution, autoformat field splitting, and the
//! numeric/time formatting used across the reports.

pub mod command;
pub mod fields;
pub mod time;

pub use command::{run_command, run_command_allow_failure, tool_version, CommandError};
pub use fields::{parse_f64, parse_i64, split_autoformat};
pub use time::{
    format_duration_compact, format_relative, format_seconds_human, format_timestamp,
};
