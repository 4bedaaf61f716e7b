//! Persistent CSV storage for cluster job data.

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use roost_core::JobRecord;
use std::fs;
use thiserror::Error;

/// Default cache directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "cluster_data";

static CACHE_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^cluster_(\d+)_jobs\.csv$").unwrap());

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("No cached data for cluster {cluster} (expected {path}); run fetch first")]
    Missing { cluster: u64, path: Utf8PathBuf },
}

/// Result of enumerating the cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
    /// The data directory does not exist yet.
    NoDataDir,
    /// Sorted cluster ids with cached data.
    Clusters(Vec<u64>),
}

/// Cache of fetched job data, one CSV per cluster.
pub struct CacheStore {
    dir: Utf8PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Cache file path for a cluster.
    pub fn path_for(&self, cluster: u64) -> Utf8PathBuf {
        self.dir.join(format!("cluster_{}_jobs.csv", cluster))
    }

    pub fn has_cluster(&self, cluster: u64) -> bool {
        self.path_for(cluster).exists()
    }

    /// Write a cluster's jobs, creating the data directory if needed.
    pub fn save(&self, cluster: u64, jobs: &[JobRecord]) -> Result<Utf8PathBuf, StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(cluster);
        let mut writer = csv::Writer::from_path(&path)?;
        for job in jobs {
            writer.serialize(job)?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// Load a cluster's cached jobs.
    pub fn load(&self, cluster: u64) -> Result<Vec<JobRecord>, StoreError> {
        let path = self.path_for(cluster);
        if !path.exists() {
            return Err(StoreError::Missing { cluster, path });
        }
        let mut reader = csv::Reader::from_path(&path)?;
        let mut jobs = Vec::new();
        for row in reader.deserialize() {
            jobs.push(row?);
        }
        Ok(jobs)
    }

    /// Enumerate cached cluster ids by parsing cache filenames.
    ///
    /// Files not matching the `cluster_<id>_jobs.csv` pattern are ignored.
    pub fn list(&self) -> Result<ListOutcome, StoreError> {
        if !self.dir.exists() {
            return Ok(ListOutcome::NoDataDir);
        }
        let mut clusters = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(caps) = CACHE_FILE.captures(name) {
                if let Ok(id) = caps[1].parse::<u64>() {
                    clusters.push(id);
                }
            }
        }
        clusters.sort_unstable();
        clusters.dedup();
        Ok(ListOutcome::Clusters(clusters))
    }

    /// Remove every cache file, leaving unrelated files untouched.
    ///
    /// Returns the removed paths. A missing data directory removes nothing.
    pub fn clean(&self) -> Result<Vec<Utf8PathBuf>, StoreError> {
        let mut removed = Vec::new();
        if !self.dir.exists() {
            return Ok(removed);
        }
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if CACHE_FILE.is_match(name) {
                let path = self.dir.join(name);
                fs::remove_file(&path)?;
                removed.push(path);
            }
        }
        removed.sort();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> CacheStore {
        CacheStore::new(Utf8Path::from_path(temp.path()).unwrap().join("cluster_data"))
    }

    fn job(cluster: i64, proc: i64) -> JobRecord {
        JobRecord {
            cluster_id: cluster,
            proc_id: proc,
            job_status: Some(4),
            request_memory: Some(2048.0),
            remote_wall_clock: Some(360.0),
            hold_reason: Some("Error from slot1@n1: out of memory".to_string()),
            ..JobRecord::default()
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let jobs = vec![job(111, 0), job(111, 1)];
        let path = store.save(111, &jobs).unwrap();
        assert!(path.as_str().ends_with("cluster_111_jobs.csv"));

        let loaded = store.load(111).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].job_id(), "111.0");
        assert_eq!(loaded[0].request_memory, Some(2048.0));
        assert_eq!(
            loaded[0].hold_reason.as_deref(),
            Some("Error from slot1@n1: out of memory")
        );
        assert_eq!(loaded[1].job_id(), "111.1");
        // fields never fetched stay absent
        assert_eq!(loaded[0].request_gpus, None);
    }

    #[test]
    fn test_load_missing_cluster() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        assert!(matches!(
            store.load(999),
            Err(StoreError::Missing { cluster: 999, .. })
        ));
    }

    #[test]
    fn test_list_no_data_dir() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        assert_eq!(store.list().unwrap(), ListOutcome::NoDataDir);
    }

    #[test]
    fn test_list_parses_cluster_ids() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        store.save(222, &[job(222, 0)]).unwrap();
        store.save(111, &[job(111, 0)]).unwrap();
        // unrelated files are ignored
        fs::write(store.dir().join("notes.txt"), "x").unwrap();
        fs::write(store.dir().join("cluster_abc_jobs.csv"), "x").unwrap();

        assert_eq!(
            store.list().unwrap(),
            ListOutcome::Clusters(vec![111, 222])
        );
    }

    #[test]
    fn test_clean_removes_all_and_only_cache_files() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        store.save(111, &[job(111, 0)]).unwrap();
        store.save(222, &[job(222, 0)]).unwrap();
        let keep = store.dir().join("README.md");
        fs::write(&keep, "keep me").unwrap();

        let removed = store.clean().unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!store.has_cluster(111));
        assert!(!store.has_cluster(222));
        assert!(keep.exists());
        assert_eq!(store.list().unwrap(), ListOutcome::Clusters(vec![]));
    }

    #[test]
    fn test_clean_without_data_dir() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        assert!(store.clean().unwrap().is_empty());
    }
}
