use std::process::ExitCode;

use tracing::error;

use crate::commands::base_commands::Commands;
use crate::commands::report_format::{format_allocation_table, format_snapshot_table};
use crate::commands::runtime::{build_source, load_config};
use crate::services::allocator::allocate;
use crate::services::feed_client::SnapshotSource;
use crate::services::snapshot_table::SnapshotTable;

/// Handles both `snapshot` and `allocate`; the latter adds the per-city table.
pub fn snapshot_command(cmd: Commands) -> ExitCode {
    let (feed, with_allocation) = match cmd {
        Commands::Snapshot { feed } => (feed, false),
        Commands::Allocate { feed } => (feed, true),
        _ => return ExitCode::FAILURE,
    };

    let config = match load_config(&feed) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load dashboard config: {e}");
            return ExitCode::FAILURE;
        }
    };
    let source = match build_source(&config) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to create feed client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let snapshot = match source.fetch_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(error = %e, "grid feed unavailable");
            eprintln!("Failed to load grid feed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let table = SnapshotTable::from_snapshot(&snapshot, config.reference_offset());
    println!("{}", format_snapshot_table(&table));
    if with_allocation {
        let allocations = allocate(&snapshot, &config.ratios);
        println!();
        println!("{}", format_allocation_table(&allocations));
    }
    ExitCode::SUCCESS
}
