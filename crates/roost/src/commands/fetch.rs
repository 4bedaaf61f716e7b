//! Fetch a cluster's jobs from the schedd into the cache.

use chrono::Local;
use miette::{IntoDiagnostic, Result};
use roost_cache::CacheStore;
use roost_condor::{fetch_cluster_jobs, validate_cluster_exists};
use roost_reports::render::banner;
use roost_reports::summary;

pub async fn run(store: &CacheStore, cluster: u64) -> Result<()> {
    println!("{}", banner("HTCondor Cluster Data Fetch"));
    println!("Cluster ID    : {}", cluster);
    println!("Output Dir    : {}", store.dir());
    println!(
        "Timestamp     : {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!();

    eprintln!("Validating cluster ID...");
    if !validate_cluster_exists(cluster).await {
        miette::bail!(
            "No jobs found for cluster {}.\n\
             Please verify:\n\
               1. The cluster ID is correct\n\
               2. You have permission to access this cluster\n\
               3. The cluster exists in HTCondor history or queue",
            cluster
        );
    }
    eprintln!("✓ Cluster found\n");

    eprintln!("Querying job history and queue...");
    let outcome = fetch_cluster_jobs(cluster).await.into_diagnostic()?;
    eprintln!("  History: {} jobs", outcome.history_count);
    eprintln!("  Queue:   {} jobs", outcome.queue_count);

    let path = store.save(cluster, &outcome.jobs).into_diagnostic()?;
    println!("✓ Successfully saved data to: {}", path);
    println!("✓ Total jobs fetched: {}", outcome.jobs.len());

    let counts = summary::counts_from_jobs(&outcome.jobs);
    if !counts.is_empty() {
        println!("\nJob Status Breakdown:");
        print!("{}", summary::breakdown_lines(&counts));
    }

    println!("\nYou can now use this data with the other reports:");
    println!("  roost analytics {}", cluster);
    println!("  roost histogram {}", cluster);
    println!("  roost dashboard {}", cluster);
    println!("  roost health {}", cluster);
    Ok(())
}
