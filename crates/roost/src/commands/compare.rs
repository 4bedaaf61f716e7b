//! Two-cluster comparison command.

use super::load_cached;
use miette::Result;
use roost_cache::CacheStore;
use roost_reports::compare::{self, ClusterSnapshot};

pub fn run(store: &CacheStore, cluster: u64, cluster2: Option<u64>) -> Result<()> {
    // Guard before touching any data.
    let Some(cluster2) = cluster2 else {
        miette::bail!(
            "compare needs a second cluster id\n\
             Usage: roost compare <CLUSTER> <CLUSTER2>  (or set the CLUSTER2 environment variable)"
        );
    };

    let jobs_a = load_cached(store, cluster)?;
    let jobs_b = load_cached(store, cluster2)?;

    let a = ClusterSnapshot::from_jobs(cluster, &jobs_a);
    let b = ClusterSnapshot::from_jobs(cluster2, &jobs_b);
    print!("{}", compare::render(&a, &b));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use tempfile::TempDir;

    #[test]
    fn test_missing_second_cluster_fails_before_data_access() {
        let temp = TempDir::new().unwrap();
        // no cache exists; the guard must fire before any load is attempted
        let store = CacheStore::new(Utf8Path::from_path(temp.path()).unwrap().join("cluster_data"));
        let err = run(&store, 111, None).unwrap_err();
        assert!(err.to_string().contains("second cluster id"));
        assert!(!store.dir().exists());
    }
}
