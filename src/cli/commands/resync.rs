//! Full resync command.

use crate::core::synchronizer::{SyncReport, Synchronizer};
use crate::services::kodi::notify_library;
use crate::services::{LibraryScanner, MetadataProvider, RecordingBackend, SkipListSource};
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Rebuild the link tree and optionally rescan the library.
pub async fn resync<B, P, S, L>(
    sync: &Synchronizer<B, P, S>,
    dest: &Path,
    include_unresolved: bool,
    library: Option<&L>,
) -> Result<SyncReport>
where
    B: RecordingBackend,
    P: MetadataProvider,
    S: SkipListSource,
    L: LibraryScanner,
{
    println!("{}", "[SYNC] Rebuilding link tree...".bold().cyan());
    println!("  {} {}", "Destination:".bold(), dest.display());
    println!();

    let report = sync.resync_from_backend(dest, include_unresolved).await?;
    print_report(&report);

    if let Some(library) = library {
        notify_library(library).await;
    }

    Ok(report)
}

/// Print the resync summary.
pub fn print_report(report: &SyncReport) {
    println!("{}", "[Sync Summary]".bold().green());
    println!(
        "  {} {} links, {} sidecars, {} directories",
        "Purged:".bold(),
        report.purged.links,
        report.purged.sidecars,
        report.purged.dirs
    );
    println!("  {} {}", "Linked:".bold(), report.linked);
    println!("  {} {}", "Skipped (recording group):".bold(), report.skipped_group);
    println!("  {} {}", "Skipped (not on TheTVDB):".bold(), report.skipped_unresolved);
    if report.skipped_duplicate > 0 {
        println!("  {} {}", "Skipped (duplicate):".bold(), report.skipped_duplicate);
    }
    if report.missing_file > 0 {
        println!("  {} {}", "Missing files:".bold().yellow(), report.missing_file);
    }

    if !report.sidecar_failures.is_empty() {
        println!(
            "  {} {}",
            "Skip list failures:".bold().yellow(),
            report.sidecar_failures.len()
        );
        for (key, reason) in &report.sidecar_failures {
            println!("    - {}: {}", key, reason);
        }
    }
    println!();
}
