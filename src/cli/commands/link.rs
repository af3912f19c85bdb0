//! Single recording command.
//!
//! Suitable for a MythTV user job or the "Recording Started" event.

use crate::core::synchronizer::Synchronizer;
use crate::services::kodi::notify_library;
use crate::services::{LibraryScanner, MetadataProvider, RecordingBackend, SkipListSource};
use crate::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::Path;

/// Link one recording and optionally rescan the library.
pub async fn link_one<B, P, S, L>(
    sync: &Synchronizer<B, P, S>,
    chan_id: u32,
    start_time: DateTime<Utc>,
    dest: &Path,
    library: Option<&L>,
) -> Result<()>
where
    B: RecordingBackend,
    P: MetadataProvider,
    S: SkipListSource,
    L: LibraryScanner,
{
    tracing::info!("Linking chanid {} starttime {}", chan_id, start_time);

    let outcome = sync.link_recording(chan_id, start_time, dest).await?;

    println!(
        "{} {}",
        "[OK] Linked:".bold().green(),
        outcome.entry.dest.display()
    );
    println!("  {} {}", "Source:".bold(), outcome.entry.source.display());
    if !outcome.identity.is_resolved() {
        println!(
            "  {}",
            "Show not found on TheTVDB, using the backend title".yellow()
        );
    }
    if let Some(ref e) = outcome.sidecar_error {
        println!("  {} {}", "[WARN] No skip list:".yellow(), e);
    }

    if let Some(library) = library {
        notify_library(library).await;
    }

    Ok(())
}
