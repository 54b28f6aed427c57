//! Allocate command - hand out external temp paths

use crate::cli::args::{AllocateArgs, OutputFormat};
use crate::config::Config;
use crate::context::ThreadExecutionContext;
use crate::error::StagingResult;
use crate::fs::{FileSystemProvider, MountTable};
use crate::staging::StagingAllocator;
use console::style;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// One allocated temp path
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    /// Destination as given
    pub destination: String,
    /// Staging directory holding the temp path
    pub staging_dir: String,
    /// Allocated temp path
    pub tmp_path: String,
}

/// Execute the allocate command
pub async fn execute(args: AllocateArgs, config: &Config) -> StagingResult<()> {
    let mounts = Arc::new(MountTable::from_config(&config.mounts)?);
    let context = Arc::new(ThreadExecutionContext::new(
        config.staging.execution_prefix.as_str(),
    ));
    let allocator =
        StagingAllocator::new(config.staging.clone(), mounts.clone(), context.clone())?;

    let allocate_all = || -> StagingResult<Vec<Allocation>> {
        args.destinations
            .iter()
            .map(|destination| {
                let tmp = allocator.external_tmp_path(destination)?;
                let staging_dir = tmp.parent().unwrap_or_else(|| tmp.clone());
                Ok(Allocation {
                    destination: destination.clone(),
                    staging_dir: staging_dir.to_string(),
                    tmp_path: tmp.to_string(),
                })
            })
            .collect()
    };

    let result = match &args.unit {
        Some(unit) => context.with_unit(unit.as_str(), allocate_all),
        None => allocate_all(),
    };

    if args.keep {
        for dir in allocator.cache().dirs() {
            if let Ok(fs) = mounts.get(&dir) {
                fs.cancel_delete_on_exit(&dir);
            }
            info!("Keeping staging dir {}", dir);
        }
    }

    let printed = result.and_then(|allocations| print(&allocations, args.format));

    let removed = mounts.close_all();
    debug!("Removed {} staging dirs on exit", removed);

    printed
}

fn print(allocations: &[Allocation], format: OutputFormat) -> StagingResult<()> {
    match format {
        OutputFormat::Table => print_table(allocations),
        OutputFormat::Json => print_json(allocations)?,
        OutputFormat::Plain => print_plain(allocations),
    }
    Ok(())
}

fn print_table(allocations: &[Allocation]) {
    println!(
        "{:<40} {:<60}",
        style("DESTINATION").bold(),
        style("TEMP PATH").bold()
    );
    println!("{}", "-".repeat(101));

    for allocation in allocations {
        println!("{:<40} {:<60}", allocation.destination, allocation.tmp_path);
    }

    println!();
    println!("{} path(s)", allocations.len());
}

fn print_json(allocations: &[Allocation]) -> StagingResult<()> {
    let json = serde_json::to_string_pretty(allocations)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(allocations: &[Allocation]) {
    for allocation in allocations {
        println!("{}", allocation.tmp_path);
    }
}
