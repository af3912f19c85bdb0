//! Destination tree synchronizer.
//!
//! Two modes:
//! - single entry: link one recording into the tree
//! - full resync: purge every managed entry, then link all current recordings
//!
//! The purge always finishes before any link is created, and refuses to
//! touch a tree that contains anything other than links and sidecars.

use crate::core::resolver::Resolver;
use crate::error::SkipListError;
use crate::generators::linkname::format_link;
use crate::generators::sidecar::write_sidecar;
use crate::models::identity::{LinkEntry, ResolvedIdentity};
use crate::models::recording::Recording;
use crate::models::skiplist::SkipList;
use crate::services::{MetadataProvider, RecordingBackend, SkipListSource};
use crate::utils::fs::{ensure_dir, is_sidecar, replace_link};
use crate::{Error, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Synchronizer options.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Recording groups skipped during a full resync.
    pub excluded_groups: Vec<String>,
    /// Whether to write skip list sidecars.
    pub write_sidecars: bool,
    /// Concurrent jobs during rebuild.
    pub jobs: usize,
    /// Whether to draw a progress bar.
    pub progress: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            excluded_groups: vec![crate::models::recording::LIVE_TV_GROUP.to_string()],
            write_sidecars: true,
            jobs: 1,
            progress: false,
        }
    }
}

/// Entries removed by a purge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurgeStats {
    pub links: usize,
    pub sidecars: usize,
    pub dirs: usize,
}

/// Result of linking one recording.
#[derive(Debug)]
pub struct LinkOutcome {
    pub identity: ResolvedIdentity,
    pub entry: LinkEntry,
    /// Set when the sidecar could not be produced. The link still exists.
    pub sidecar_error: Option<SkipListError>,
}

/// Summary of a full resync.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub purged: PurgeStats,
    pub linked: usize,
    pub skipped_group: usize,
    pub skipped_unresolved: usize,
    pub skipped_duplicate: usize,
    pub missing_file: usize,
    /// Recording key and reason, per failed sidecar.
    pub sidecar_failures: Vec<(String, String)>,
}

/// What the purge will do with one entry.
enum Purge {
    File(PathBuf, bool),
    Dir(PathBuf),
}

/// Remove every managed entry below `root`, keeping `root` itself.
///
/// The whole tree is checked before anything is deleted: a single foreign
/// file aborts the purge with the tree untouched.
pub fn purge_tree(root: &Path) -> Result<PurgeStats> {
    let mut stats = PurgeStats::default();

    if !root.exists() {
        return Ok(stats);
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    // Contents first, so directories come after everything inside them.
    let mut plan = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path().to_path_buf();
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            plan.push(Purge::File(path, true));
        } else if file_type.is_dir() {
            plan.push(Purge::Dir(path));
        } else if file_type.is_file() && is_sidecar(&path) {
            plan.push(Purge::File(path, false));
        } else {
            tracing::error!("Foreign file in destination: {:?}", path);
            return Err(Error::ForeignFile(path));
        }
    }

    for item in plan {
        match item {
            Purge::File(path, is_link) => {
                fs::remove_file(&path)?;
                tracing::debug!("Removed: {:?}", path);
                if is_link {
                    stats.links += 1;
                } else {
                    stats.sidecars += 1;
                }
            }
            Purge::Dir(path) => {
                fs::remove_dir(&path)?;
                tracing::debug!("Removed directory: {:?}", path);
                stats.dirs += 1;
            }
        }
    }

    tracing::info!(
        "Purged {} links, {} sidecars, {} directories",
        stats.links,
        stats.sidecars,
        stats.dirs
    );
    Ok(stats)
}

/// Link tree synchronizer.
pub struct Synchronizer<B, P, S> {
    backend: B,
    resolver: Resolver<P>,
    skiplist: S,
    options: SyncOptions,
}

impl<B, P, S> Synchronizer<B, P, S>
where
    B: RecordingBackend,
    P: MetadataProvider,
    S: SkipListSource,
{
    pub fn new(backend: B, provider: P, skiplist: S, options: SyncOptions) -> Self {
        Self {
            backend,
            resolver: Resolver::new(provider),
            skiplist,
            options,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn resolver(&self) -> &Resolver<P> {
        &self.resolver
    }

    pub fn skiplist(&self) -> &S {
        &self.skiplist
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Where a resolved recording lives in the tree.
    pub fn entry_for(&self, identity: &ResolvedIdentity, source: PathBuf, dest_root: &Path) -> LinkEntry {
        let name = format_link(identity, &source);
        let dir = dest_root.join(&name.dir);

        LinkEntry {
            dest: dir.join(name.file_name()),
            sidecar: dir.join(name.sidecar_name()),
            source,
        }
    }

    /// Link a single recording into the tree.
    pub async fn link_one(&self, recording: &Recording, dest_root: &Path) -> Result<LinkOutcome> {
        let identity = self.resolver.resolve(recording).await;
        let source = self.backend.checkfile(recording).await?;
        let entry = self.entry_for(&identity, source, dest_root);
        self.materialize(recording, identity, entry).await
    }

    /// Fetch a recording from the backend and link it.
    pub async fn link_recording(
        &self,
        chan_id: u32,
        start_time: chrono::DateTime<chrono::Utc>,
        dest_root: &Path,
    ) -> Result<LinkOutcome> {
        let recording = self.backend.recording(chan_id, start_time).await?;
        self.link_one(&recording, dest_root).await
    }

    /// Create directories, the link, and the sidecar for one entry.
    async fn materialize(
        &self,
        recording: &Recording,
        identity: ResolvedIdentity,
        entry: LinkEntry,
    ) -> Result<LinkOutcome> {
        if let Some(parent) = entry.dest.parent() {
            ensure_dir(parent)?;
        }
        replace_link(&entry.source, &entry.dest)?;

        let sidecar_error = if self.options.write_sidecars {
            self.write_skip_list(recording, &entry.sidecar).await.err()
        } else {
            None
        };

        if let Some(ref e) = sidecar_error {
            tracing::warn!("No skip list for {}: {}", recording.key(), e);
        }

        Ok(LinkOutcome {
            identity,
            entry,
            sidecar_error,
        })
    }

    /// Fetch the skip list for a recording and write it to `path`.
    pub async fn write_skip_list(
        &self,
        recording: &Recording,
        path: &Path,
    ) -> std::result::Result<SkipList, SkipListError> {
        let list = self.skiplist.skip_list(recording).await?;
        write_sidecar(path, &list)?;
        Ok(list)
    }

    /// Rebuild the whole tree from the backend's current recordings.
    pub async fn resync_from_backend(&self, dest_root: &Path, include_unresolved: bool) -> Result<SyncReport> {
        let recordings = self.backend.recordings().await?;
        self.resync_all(&recordings, dest_root, include_unresolved).await
    }

    /// Purge the tree, then link every eligible recording.
    pub async fn resync_all(
        &self,
        recordings: &[Recording],
        dest_root: &Path,
        include_unresolved: bool,
    ) -> Result<SyncReport> {
        let mut report = SyncReport {
            purged: purge_tree(dest_root)?,
            ..Default::default()
        };
        ensure_dir(dest_root)?;

        let jobs = self.options.jobs.max(1);

        let mut candidates = Vec::new();
        for recording in recordings {
            if self.options.excluded_groups.iter().any(|g| *g == recording.rec_group) {
                tracing::debug!("Skipping {} in group {}", recording.key(), recording.rec_group);
                report.skipped_group += 1;
            } else {
                candidates.push(recording);
            }
        }

        // Resolve in input order so duplicate handling is deterministic.
        let resolved: Vec<(&Recording, ResolvedIdentity)> = stream::iter(candidates)
            .map(|recording| async move { (recording, self.resolver.resolve(recording).await) })
            .buffered(jobs)
            .collect()
            .await;

        let mut planned = Vec::new();
        let mut seen = HashSet::new();
        for (recording, identity) in resolved {
            if !identity.is_resolved() && !include_unresolved {
                tracing::debug!("Skipping unresolved {:?}", recording.title);
                report.skipped_unresolved += 1;
                continue;
            }

            let source = match self.backend.checkfile(recording).await {
                Ok(source) => source,
                Err(Error::CheckfileNotFound(file)) => {
                    tracing::warn!("Recording file missing for {}: {}", recording.key(), file);
                    report.missing_file += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let entry = self.entry_for(&identity, source, dest_root);
            // Keyed on the sidecar: links differing only in extension share it.
            if !seen.insert(entry.sidecar.clone()) {
                tracing::warn!("Duplicate link {:?} for {}, keeping the first", entry.dest, recording.key());
                report.skipped_duplicate += 1;
                continue;
            }
            planned.push((recording, identity, entry));
        }

        tracing::info!("Linking {} recordings into {:?}", planned.len(), dest_root);
        let pb = progress_bar(planned.len() as u64, self.options.progress);

        let outcomes: Vec<(String, LinkOutcome)> = stream::iter(planned)
            .map(|(recording, identity, entry)| {
                let pb = &pb;
                async move {
                    pb.set_message(identity.show.clone());
                    let outcome = self.materialize(recording, identity, entry).await;
                    pb.inc(1);
                    outcome.map(|o| (recording.key(), o))
                }
            })
            .buffer_unordered(jobs)
            .try_collect()
            .await?;

        pb.finish_and_clear();

        for (key, outcome) in outcomes {
            report.linked += 1;
            if let Some(e) = outcome.sidecar_error {
                report.sidecar_failures.push((key, e.to_string()));
            }
        }

        Ok(report)
    }
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_purge_missing_root() {
        let stats = purge_tree(Path::new("/nonexistent/mythlink/dest")).unwrap();
        assert_eq!(stats, PurgeStats::default());
    }

    #[test]
    fn test_purge_keeps_root() {
        let temp_dir = TempDir::new().unwrap();
        let season = temp_dir.path().join("Show").join("Season 01");
        fs::create_dir_all(&season).unwrap();
        fs::write(season.join("Show - S01E01 - Pilot.txt"), "x").unwrap();

        let stats = purge_tree(temp_dir.path()).unwrap();

        assert_eq!(stats.sidecars, 1);
        assert_eq!(stats.dirs, 2);
        assert!(temp_dir.path().is_dir());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_purge_root_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("dest");
        fs::write(&file, "x").unwrap();
        assert!(matches!(purge_tree(&file), Err(Error::NotADirectory(_))));
    }
}
