//! External collaborators.
//!
//! Each collaborator is a trait so the resolver and synchronizer can be
//! driven by the real clients or by in-memory fakes.

pub mod kodi;
pub mod mythtv;
pub mod skiplist;
pub mod tvdb;

use crate::error::SkipListError;
use crate::models::recording::Recording;
use crate::models::skiplist::SkipList;
use crate::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Source of truth for recordings and their files.
#[allow(async_fn_in_trait)]
pub trait RecordingBackend {
    /// All current recordings.
    async fn recordings(&self) -> Result<Vec<Recording>>;

    /// A single recording by channel and start time.
    async fn recording(&self, chan_id: u32, start_time: DateTime<Utc>) -> Result<Recording>;

    /// Absolute path of the recording's file on this machine.
    async fn checkfile(&self, recording: &Recording) -> Result<PathBuf>;
}

/// Episode metadata lookup service.
#[allow(async_fn_in_trait)]
pub trait MetadataProvider {
    /// Series ID for a show title. `Ok(None)` means the show is not known.
    async fn lookup_by_title(&self, title: &str) -> Result<Option<u64>>;

    /// Canonical series name.
    async fn series_name(&self, series_id: u64) -> Result<String>;

    /// Episode title. `Ok(None)` when the season/episode does not exist.
    async fn episode_title(
        &self,
        series_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<Option<String>>;
}

/// Commercial-break detector.
#[allow(async_fn_in_trait)]
pub trait SkipListSource {
    async fn skip_list(
        &self,
        recording: &Recording,
    ) -> std::result::Result<SkipList, SkipListError>;
}

/// Media library that can be told to rescan.
#[allow(async_fn_in_trait)]
pub trait LibraryScanner {
    async fn scan(&self) -> Result<()>;
    async fn clean(&self) -> Result<()>;
}
