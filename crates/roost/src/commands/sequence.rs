//! Composite commands: all, quick, and the guided demo.
//!
//! Steps run strictly in order; the first failure stops the sequence.

use super::{fetch, hold_bucket, reports};
use miette::{IntoDiagnostic, Result};
use roost_cache::CacheStore;
use roost_reports::hold::HoldOptions;
use roost_reports::render::{CYAN, RESET};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fetch,
    Summarise,
    Health,
    Analytics,
    Histogram,
    Dashboard,
    HoldBucket,
}

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::Fetch => "Fetch cluster data",
            Step::Summarise => "Job status summary",
            Step::Health => "Cluster health",
            Step::Analytics => "Resource analytics",
            Step::Histogram => "Runtime histogram",
            Step::Dashboard => "Dashboard",
            Step::HoldBucket => "Held job buckets",
        }
    }
}

/// `all` runs every report against an already-fetched cluster.
pub fn all_steps() -> [Step; 5] {
    [
        Step::Health,
        Step::Analytics,
        Step::Histogram,
        Step::Dashboard,
        Step::HoldBucket,
    ]
}

/// `quick` goes from nothing to a verdict.
pub fn quick_steps() -> [Step; 2] {
    [Step::Fetch, Step::Health]
}

/// The demo tour, in presentation order.
pub fn demo_steps() -> [Step; 6] {
    [
        Step::Fetch,
        Step::Summarise,
        Step::Analytics,
        Step::Histogram,
        Step::HoldBucket,
        Step::Dashboard,
    ]
}

fn step_banner(step: Step) {
    println!("\n{}==> {}{}\n", CYAN, step.title(), RESET);
}

async fn run_step(store: &CacheStore, cluster: u64, step: Step) -> Result<()> {
    match step {
        Step::Fetch => fetch::run(store, cluster).await,
        Step::Summarise => reports::summarise(cluster).await,
        Step::Health => reports::health(store, cluster),
        Step::Analytics => reports::analytics(store, cluster),
        Step::Histogram => reports::histogram(store, cluster, false),
        Step::Dashboard => reports::dashboard(store, cluster),
        Step::HoldBucket => {
            hold_bucket::run(cluster, &HoldOptions::default(), None).await
        }
    }
}

pub async fn run_all(store: &CacheStore, cluster: u64) -> Result<()> {
    for step in all_steps() {
        step_banner(step);
        run_step(store, cluster, step).await?;
    }
    Ok(())
}

pub async fn run_quick(store: &CacheStore, cluster: u64) -> Result<()> {
    for step in quick_steps() {
        step_banner(step);
        run_step(store, cluster, step).await?;
    }
    Ok(())
}

fn pause() -> Result<()> {
    print!("\nPress Enter to continue...");
    use std::io::Write as _;
    std::io::stdout().flush().into_diagnostic()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).into_diagnostic()?;
    Ok(())
}

pub async fn run_demo(store: &CacheStore, cluster: u64, no_pause: bool) -> Result<()> {
    println!("{}Roost guided tour - cluster {}{}", CYAN, cluster, RESET);
    let steps = demo_steps();
    for (i, step) in steps.iter().enumerate() {
        step_banner(*step);
        run_step(store, cluster, *step).await?;
        if !no_pause && i + 1 < steps.len() {
            pause()?;
        }
    }
    println!("\n{}Tour complete.{}", CYAN, RESET);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_runs_reports_in_order() {
        assert_eq!(
            all_steps(),
            [
                Step::Health,
                Step::Analytics,
                Step::Histogram,
                Step::Dashboard,
                Step::HoldBucket,
            ]
        );
    }

    #[test]
    fn test_quick_fetches_first() {
        assert_eq!(quick_steps(), [Step::Fetch, Step::Health]);
    }

    #[test]
    fn test_demo_starts_with_fetch_and_ends_with_dashboard() {
        let steps = demo_steps();
        assert_eq!(steps[0], Step::Fetch);
        assert_eq!(steps[steps.len() - 1], Step::Dashboard);
    }
}
