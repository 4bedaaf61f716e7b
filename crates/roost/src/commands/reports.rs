//! Cache-backed report commands and the live summarise.

use super::load_cached;
use chrono::Utc;
use miette::{IntoDiagnostic, Result};
use roost_cache::CacheStore;
use roost_condor::status_counts;
use roost_reports::{analytics, dashboard, health, histogram, summary};

pub fn analytics(store: &CacheStore, cluster: u64) -> Result<()> {
    let jobs = load_cached(store, cluster)?;
    print!("{}", analytics::report(cluster, &jobs));
    Ok(())
}

pub fn histogram(store: &CacheStore, cluster: u64, show_fast_jobs: bool) -> Result<()> {
    let jobs = load_cached(store, cluster)?;
    print!("{}", histogram::render_scatter(&jobs));
    print!(
        "{}",
        histogram::render_histogram(cluster, &jobs, show_fast_jobs, Utc::now())
    );
    Ok(())
}

pub fn health(store: &CacheStore, cluster: u64) -> Result<()> {
    let jobs = load_cached(store, cluster)?;
    print!("{}", health::render(&health::assess(cluster, &jobs)));
    Ok(())
}

pub fn dashboard(store: &CacheStore, cluster: u64) -> Result<()> {
    let jobs = load_cached(store, cluster)?;
    print!("{}", dashboard::render(cluster, &jobs));
    Ok(())
}

/// Live status counts straight from the schedd.
pub async fn summarise(cluster: u64) -> Result<()> {
    eprintln!("Querying schedd for cluster {}...", cluster);
    let counts = status_counts(cluster).await.into_diagnostic()?;
    print!("{}", summary::render_counts(cluster, &counts));
    Ok(())
}
