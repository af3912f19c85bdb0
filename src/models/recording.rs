//! Recording data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recording group used by MythTV for in-progress Live TV buffers.
pub const LIVE_TV_GROUP: &str = "LiveTV";

/// A recording as reported by the MythTV backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Channel ID.
    pub chan_id: u32,
    /// Recording start time (UTC).
    pub start_time: DateTime<Utc>,
    /// Program title.
    pub title: String,
    /// Episode subtitle.
    pub subtitle: Option<String>,
    /// Season number (0 = unknown).
    pub season: u32,
    /// Episode number.
    pub episode: u32,
    /// Syndicated episode code, e.g. `E7S3`.
    pub syndicated_episode: Option<String>,
    /// Internet reference, e.g. `ttvdb.py_79349`.
    pub inetref: Option<String>,
    /// Recording group.
    pub rec_group: String,
    /// Storage group holding the file, when the backend reports one.
    pub storage_group: Option<String>,
    /// Base file name inside the storage group.
    pub file_name: String,
}

impl Recording {
    /// Short identifier used in logs.
    pub fn key(&self) -> String {
        format!("{}_{}", self.chan_id, self.start_time.format("%Y%m%d%H%M%S"))
    }

    /// Start time in the compact form MythTV command line tools expect.
    pub fn start_timestamp(&self) -> String {
        self.start_time.format("%Y%m%d%H%M%S").to_string()
    }

    /// Subtitle, if present and not blank.
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Syndicated episode code, if present and not blank.
    pub fn syndicated_episode(&self) -> Option<&str> {
        self.syndicated_episode
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_key_and_timestamp() {
        let rec = Recording {
            chan_id: 1051,
            start_time: Utc.with_ymd_and_hms(2024, 3, 9, 20, 0, 5).unwrap(),
            ..Default::default()
        };
        assert_eq!(rec.start_timestamp(), "20240309200005");
        assert_eq!(rec.key(), "1051_20240309200005");
    }

    #[test]
    fn test_blank_fields_are_absent() {
        let rec = Recording {
            subtitle: Some("  ".to_string()),
            syndicated_episode: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(rec.subtitle(), None);
        assert_eq!(rec.syndicated_episode(), None);
    }
}
