//! Resolved identity and link entry models.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Canonical identity of a recording.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    /// Show name (TheTVDB series name, or the raw backend title).
    pub show: String,
    /// TheTVDB series ID. `None` means the show is unresolved.
    pub series_id: Option<u64>,
    /// Season number.
    pub season: u32,
    /// Episode number.
    pub episode: u32,
    /// Episode title, possibly empty.
    pub episode_title: String,
}

impl ResolvedIdentity {
    /// Whether the show was matched against the metadata provider.
    pub fn is_resolved(&self) -> bool {
        self.series_id.is_some()
    }
}

/// A symlink to create in the destination tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Absolute path of the link.
    pub dest: PathBuf,
    /// Link target (the recording file).
    pub source: PathBuf,
    /// Companion skip list path.
    pub sidecar: PathBuf,
}
