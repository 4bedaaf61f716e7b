//! Command handlers.

pub mod compare;
pub mod fetch;
pub mod hold_bucket;
pub mod maintenance;
pub mod reports;
pub mod sequence;

use miette::{IntoDiagnostic, Result, WrapErr};
use roost_cache::CacheStore;
use roost_cli::{Args, Command};
use roost_core::JobRecord;

/// Dispatch the parsed CLI to its handler.
pub async fn dispatch(args: Args) -> Result<()> {
    let store = CacheStore::new(args.data_dir.clone());

    match args.command {
        Command::Fetch { cluster } => fetch::run(&store, cluster).await,
        Command::Summarise { cluster } => reports::summarise(cluster).await,
        Command::Analytics { cluster } => reports::analytics(&store, cluster),
        Command::Histogram {
            cluster,
            show_fast_jobs,
        } => reports::histogram(&store, cluster, show_fast_jobs),
        Command::Health { cluster } => reports::health(&store, cluster),
        Command::Dashboard { cluster } => reports::dashboard(&store, cluster),
        Command::HoldBucket {
            cluster,
            min_count,
            top,
            code,
            threshold,
            sort_by,
            show_job_ids,
            export_jobs,
        } => {
            let opts = hold_bucket::options(min_count, top, code, threshold, sort_by, show_job_ids);
            hold_bucket::run(cluster, &opts, export_jobs.as_deref()).await
        }
        Command::Compare { cluster, cluster2 } => compare::run(&store, cluster, cluster2),
        Command::All { cluster } => sequence::run_all(&store, cluster).await,
        Command::Quick { cluster } => sequence::run_quick(&store, cluster).await,
        Command::Demo { cluster, no_pause } => sequence::run_demo(&store, cluster, no_pause).await,
        Command::List => maintenance::list(&store),
        Command::Clean { yes } => maintenance::clean(&store, yes),
        Command::Check => maintenance::check(&store).await,
        Command::Install => maintenance::install(),
    }
}

/// Load a cluster's cached jobs, pointing the user at fetch when the
/// cache is missing.
pub fn load_cached(store: &CacheStore, cluster: u64) -> Result<Vec<JobRecord>> {
    store
        .load(cluster)
        .into_diagnostic()
        .wrap_err_with(|| format!("cluster {} is not cached under {}", cluster, store.dir()))
}
