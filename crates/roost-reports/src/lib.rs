//! Report engines for roost.
//!
//! Everything in this crate is pure: report functions take job data and
//! return rendered text (or intermediate metrics), leaving scheduler and
//! filesystem access to the caller.

pub mod analytics;
pub mod compare;
pub mod dashboard;
pub mod health;
pub mod histogram;
pub mod hold;
pub mod render;
pub mod similarity;
pub mod stats;
pub mod summary;

pub use analytics::{analyze, ClusterAnalytics};
pub use compare::ClusterSnapshot;
pub use health::HealthReport;
pub use histogram::{runtime_stats, RuntimeStats};
pub use hold::{HoldOptions, HoldReport, SortBy};
