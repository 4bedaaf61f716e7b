//! Cache maintenance and environment checks.

use miette::{IntoDiagnostic, Result};
use roost_cache::{CacheStore, ListOutcome};
use roost_parsers::tool_version;
use std::io::Write as _;

/// Print cached cluster ids.
pub fn list(store: &CacheStore) -> Result<()> {
    match store.list().into_diagnostic()? {
        ListOutcome::NoDataDir => {
            println!(
                "No data directory at {} - nothing has been fetched yet.",
                store.dir()
            );
        }
        ListOutcome::Clusters(clusters) if clusters.is_empty() => {
            println!("No cached clusters in {}.", store.dir());
        }
        ListOutcome::Clusters(clusters) => {
            for cluster in clusters {
                println!("{}", cluster);
            }
        }
    }
    Ok(())
}

/// Remove the cached cluster CSVs, prompting unless `--yes`.
pub fn clean(store: &CacheStore, yes: bool) -> Result<()> {
    let count = match store.list().into_diagnostic()? {
        ListOutcome::NoDataDir => 0,
        ListOutcome::Clusters(clusters) => clusters.len(),
    };
    if count == 0 {
        println!("Nothing to clean in {}.", store.dir());
        return Ok(());
    }

    if !yes {
        print!(
            "Remove {} cached file(s) from {}? [y/N] ",
            count,
            store.dir()
        );
        std::io::stdout().flush().into_diagnostic()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer).into_diagnostic()?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let removed = store.clean().into_diagnostic()?;
    for path in &removed {
        println!("removed {}", path);
    }
    println!("✓ Removed {} cached file(s)", removed.len());
    Ok(())
}

/// Probe the external tool surface. Reports, never blocks.
pub async fn check(store: &CacheStore) -> Result<()> {
    println!("Checking HTCondor client tools...\n");
    let mut missing = 0;
    for tool in ["condor_version", "condor_q", "condor_history"] {
        match tool_version(tool).await {
            Some(version) => println!("  ✓ {:<16} {}", tool, version),
            None => {
                println!("  ✗ {:<16} not found on PATH", tool);
                missing += 1;
            }
        }
    }

    println!();
    match std::fs::create_dir_all(store.dir()) {
        Ok(()) => println!("  ✓ data directory {} is writable", store.dir()),
        Err(e) => println!("  ✗ data directory {}: {}", store.dir(), e),
    }

    if missing > 0 {
        println!("\n{} tool(s) missing. See `roost install` for guidance.", missing);
    }
    Ok(())
}

/// Print installation guidance for the condor client tools.
pub fn install() -> Result<()> {
    println!("roost drives the HTCondor client tools; install them with your");
    println!("platform's package manager:");
    println!();
    println!("  Debian/Ubuntu : apt-get install htcondor");
    println!("  RHEL/Fedora   : dnf install condor");
    println!("  conda         : conda install -c conda-forge htcondor-utils");
    println!();
    println!("On an HTCondor submit node the tools are usually already present;");
    println!("verify with `roost check`.");
    println!();
    println!("Docs: https://htcondor.readthedocs.io/en/latest/getting-htcondor/");
    Ok(())
}
