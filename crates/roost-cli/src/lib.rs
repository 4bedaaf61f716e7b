//! CLI argument parsing for roost.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "roost")]
#[command(version)]
#[command(about = "HTCondor cluster job analytics and reporting")]
pub struct Args {
    /// Directory holding cached cluster CSVs
    #[arg(
        long,
        global = true,
        env = "ROOST_DATA_DIR",
        default_value = "cluster_data"
    )]
    pub data_dir: Utf8PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Sort order for hold-bucket rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum HoldSort {
    /// Number of jobs, most common first
    #[default]
    Count,
    /// Hold reason label, alphabetical
    Code,
    /// Percentage of total held jobs
    Percent,
    /// Average hold duration, longest first
    Time,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a cluster's job data from the schedd into the CSV cache
    #[command(after_long_help = "\
EXAMPLES:
    roost fetch 4641492
    CLUSTER=4641492 roost fetch
")]
    Fetch {
        /// Cluster ID to fetch
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
    },

    /// Live per-state job counts for a cluster (no cache needed)
    Summarise {
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
    },

    /// Resource request/usage analytics for a cached cluster
    #[command(after_long_help = "\
EXAMPLES:
    # Full resource report with recommendations
    roost analytics 4641492

    # Fetch first if the cluster is not cached yet
    roost fetch 4641492 && roost analytics 4641492

Reads the cached CSV written by `roost fetch`. Memory and disk values are
reported in GiB; efficiencies are medians of per-job usage/request ratios.
")]
    Analytics {
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
    },

    /// Runtime percentile histogram and scatter plot for a cached cluster
    #[command(after_long_help = "\
EXAMPLES:
    roost histogram 4641492
    roost histogram 4641492 --show-fast-jobs

Bins are the 0-100% runtime percentiles in steps of 10. Bins whose median
runtime is under 10 minutes are highlighted red; --show-fast-jobs lists
their job ids for investigation.
")]
    Histogram {
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
        /// List the job ids in red (fast) bins
        #[arg(long)]
        show_fast_jobs: bool,
    },

    /// Bucket and tabulate a cluster's held jobs by hold reason
    #[command(name = "hold-bucket")]
    #[command(after_long_help = "\
EXAMPLES:
    # Basic usage
    roost hold-bucket 4641492

    # Filter and sort
    roost hold-bucket 4641492 --min-count 10 --sort-by time
    roost hold-bucket 4641492 --top 5 --sort-by percent
    roost hold-bucket 4641492 --code 34 --threshold 0.8

    # Export for bulk operations
    roost hold-bucket 4641492 --export-jobs held.csv
    condor_release $(cut -d, -f1 held.csv | tail -n +2)

Common codes: 3 (JobPolicy), 34 (Memory), 12 (Output Transfer),
13 (Input Transfer). The full legend is printed with each report.
")]
    HoldBucket {
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
        /// Only show buckets with at least N jobs
        #[arg(long, value_name = "N", default_value_t = 1)]
        min_count: usize,
        /// Show only the top N buckets
        #[arg(long, value_name = "N")]
        top: Option<usize>,
        /// Only jobs with this HoldReasonCode
        #[arg(long, value_name = "CODE")]
        code: Option<i64>,
        /// Similarity threshold (0.0-1.0) for grouping reasons
        #[arg(long, value_name = "RATIO", default_value_t = 0.7)]
        threshold: f64,
        /// Sort order for the bucket table
        #[arg(long, value_enum, default_value_t = HoldSort::Count)]
        sort_by: HoldSort,
        /// Show proc ids per bucket
        #[arg(long)]
        show_job_ids: bool,
        /// Export held job ids to a CSV file
        #[arg(long, value_name = "FILENAME")]
        export_jobs: Option<Utf8PathBuf>,
    },

    /// Composite health score for a cached cluster
    Health {
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
    },

    /// One-screen overview of a cached cluster
    Dashboard {
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
    },

    /// Compare headline metrics of two cached clusters
    #[command(after_long_help = "\
EXAMPLES:
    roost compare 4641492 4641500
    CLUSTER=4641492 CLUSTER2=4641500 roost compare
")]
    Compare {
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
        /// Second cluster ID (or the CLUSTER2 environment variable)
        #[arg(env = "CLUSTER2")]
        cluster2: Option<u64>,
    },

    /// Run every report for one cluster, in order
    All {
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
    },

    /// Fetch then health: the fastest route to a verdict
    Quick {
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
    },

    /// Guided tour of every report, pausing between steps
    Demo {
        #[arg(env = "CLUSTER", default_value_t = 12345)]
        cluster: u64,
        /// Run without interactive pauses
        #[arg(long)]
        no_pause: bool,
    },

    /// List cached cluster ids
    List,

    /// Delete the cached cluster CSVs
    Clean {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Check that the HTCondor client tools are available
    Check,

    /// Print installation guidance for the HTCondor client tools
    Install,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_default_cluster() {
        let args = Args::try_parse_from(["roost", "fetch"]).unwrap();
        match args.command {
            Command::Fetch { cluster } => assert_eq!(cluster, 12345),
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_hold_bucket_options() {
        let args = Args::try_parse_from([
            "roost",
            "hold-bucket",
            "4641492",
            "--min-count",
            "10",
            "--sort-by",
            "time",
            "--show-job-ids",
        ])
        .unwrap();
        match args.command {
            Command::HoldBucket {
                cluster,
                min_count,
                sort_by,
                show_job_ids,
                threshold,
                ..
            } => {
                assert_eq!(cluster, 4641492);
                assert_eq!(min_count, 10);
                assert_eq!(sort_by, HoldSort::Time);
                assert!(show_job_ids);
                assert!((threshold - 0.7).abs() < 1e-9);
            }
            _ => panic!("expected hold-bucket"),
        }
    }

    #[test]
    fn test_compare_second_cluster_optional() {
        let args = Args::try_parse_from(["roost", "compare", "1", "2"]).unwrap();
        match args.command {
            Command::Compare { cluster, cluster2 } => {
                assert_eq!(cluster, 1);
                assert_eq!(cluster2, Some(2));
            }
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn test_data_dir_default() {
        let args = Args::try_parse_from(["roost", "list"]).unwrap();
        assert_eq!(args.data_dir.as_str(), "cluster_data");
    }
}
