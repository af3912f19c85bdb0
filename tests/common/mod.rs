//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use mythlink::error::SkipListError;
use mythlink::models::recording::Recording;
use mythlink::models::skiplist::{SkipList, SkipRange};
use mythlink::services::{MetadataProvider, RecordingBackend, SkipListSource};
use mythlink::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::WalkDir;

/// Backend whose files live in a local directory.
pub struct FakeBackend {
    pub recordings: Vec<Recording>,
    pub storage_dir: PathBuf,
}

impl FakeBackend {
    /// Create the backend and an empty file for every recording.
    pub fn with_files(recordings: Vec<Recording>, storage_dir: &Path) -> Self {
        fs::create_dir_all(storage_dir).unwrap();
        for rec in &recordings {
            fs::write(storage_dir.join(&rec.file_name), "video").unwrap();
        }
        Self {
            recordings,
            storage_dir: storage_dir.to_path_buf(),
        }
    }
}

impl RecordingBackend for FakeBackend {
    async fn recordings(&self) -> Result<Vec<Recording>> {
        Ok(self.recordings.clone())
    }

    async fn recording(&self, chan_id: u32, start_time: DateTime<Utc>) -> Result<Recording> {
        self.recordings
            .iter()
            .find(|r| r.chan_id == chan_id && r.start_time == start_time)
            .cloned()
            .ok_or_else(|| Error::RecordingNotFound {
                chan_id,
                start: start_time.to_rfc3339(),
            })
    }

    async fn checkfile(&self, recording: &Recording) -> Result<PathBuf> {
        let path = self.storage_dir.join(&recording.file_name);
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::CheckfileNotFound(recording.file_name.clone()))
        }
    }
}

/// Metadata provider backed by maps.
#[derive(Default)]
pub struct FakeProvider {
    pub titles: HashMap<String, u64>,
    pub names: HashMap<u64, String>,
    pub episodes: HashMap<(u64, u32, u32), String>,
    /// Every call fails, as if the service were down.
    pub offline: bool,
    pub lookups: AtomicUsize,
}

impl FakeProvider {
    pub fn with_show(mut self, title: &str, id: u64, name: &str) -> Self {
        self.titles.insert(title.to_string(), id);
        self.names.insert(id, name.to_string());
        self
    }

    pub fn with_episode(mut self, id: u64, season: u32, episode: u32, title: &str) -> Self {
        self.episodes.insert((id, season, episode), title.to_string());
        self
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }
}

impl MetadataProvider for FakeProvider {
    async fn lookup_by_title(&self, title: &str) -> Result<Option<u64>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(Error::Tvdb("offline".to_string()));
        }
        Ok(self.titles.get(title).copied())
    }

    async fn series_name(&self, series_id: u64) -> Result<String> {
        if self.offline {
            return Err(Error::Tvdb("offline".to_string()));
        }
        self.names
            .get(&series_id)
            .cloned()
            .ok_or_else(|| Error::Tvdb(format!("series {} not found", series_id)))
    }

    async fn episode_title(&self, series_id: u64, season: u32, episode: u32) -> Result<Option<String>> {
        if self.offline {
            return Err(Error::Tvdb("offline".to_string()));
        }
        Ok(self.episodes.get(&(series_id, season, episode)).cloned())
    }
}

/// Skip list detector returning two breaks, or failing for chosen channels.
#[derive(Default)]
pub struct FakeSkipList {
    pub failing_channels: HashSet<u32>,
    pub calls: AtomicUsize,
}

impl FakeSkipList {
    pub fn failing_for(chan_id: u32) -> Self {
        Self {
            failing_channels: HashSet::from([chan_id]),
            ..Default::default()
        }
    }
}

impl SkipListSource for FakeSkipList {
    async fn skip_list(&self, recording: &Recording) -> std::result::Result<SkipList, SkipListError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_channels.contains(&recording.chan_id) {
            return Err(SkipListError::ExitStatus {
                program: "mythutil".to_string(),
                status: "exit status: 1".to_string(),
            });
        }
        Ok(SkipList {
            ranges: vec![
                SkipRange { start: 0, end: 1200 },
                SkipRange { start: 30000, end: 36000 },
            ],
        })
    }
}

/// A recording with sensible defaults.
pub fn recording(chan_id: u32, title: &str, season: u32, episode: u32) -> Recording {
    let start_time = Utc.with_ymd_and_hms(2024, 3, 9, 20, 0, 0).unwrap()
        + chrono::Duration::minutes(i64::from(chan_id % 1000));
    Recording {
        chan_id,
        start_time,
        title: title.to_string(),
        season,
        episode,
        rec_group: "Default".to_string(),
        file_name: format!("{}_{}.ts", chan_id, start_time.format("%Y%m%d%H%M%S")),
        ..Default::default()
    }
}

/// Every entry below `root`: link target for links, contents for files,
/// `<dir>` for directories.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, String> {
    let mut out = BTreeMap::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(root).unwrap().to_path_buf();
        let value = if entry.file_type().is_symlink() {
            format!("-> {}", fs::read_link(entry.path()).unwrap().display())
        } else if entry.file_type().is_dir() {
            "<dir>".to_string()
        } else {
            fs::read_to_string(entry.path()).unwrap()
        };
        out.insert(rel, value);
    }
    out
}

/// Number of symlinks below `root`.
pub fn count_links(root: &Path) -> usize {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_symlink())
        .count()
}
