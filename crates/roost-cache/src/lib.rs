//! CSV cache for fetched cluster job data.

pub mod store;

pub use store::{CacheStore, ListOutcome, StoreError, DEFAULT_DATA_DIR};
