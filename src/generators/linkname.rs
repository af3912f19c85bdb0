//! Link path and display name generator.

use crate::models::identity::ResolvedIdentity;
use std::path::{Path, PathBuf};

/// Extension of sidecar files.
pub const SIDECAR_EXTENSION: &str = "txt";

/// Placeholder for a path segment with nothing usable in it.
const EMPTY_SEGMENT: &str = "Unknown";

/// Longest file name most filesystems accept, in bytes.
pub const MAX_NAME_BYTES: usize = 255;

/// Formatted location of a recording inside the destination tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkName {
    /// `<show>/Season <ss>` relative to the destination root.
    pub dir: PathBuf,
    /// `<show> - S<ss>E<ee> - <episode title>`.
    pub display: String,
    /// Extension of the recording file, if any.
    pub extension: Option<String>,
}

impl LinkName {
    /// File name of the link.
    pub fn file_name(&self) -> String {
        match self.extension {
            Some(ref ext) => format!("{}.{}", self.display, ext),
            None => self.display.clone(),
        }
    }

    /// File name of the sidecar.
    pub fn sidecar_name(&self) -> String {
        format!("{}.{}", self.display, SIDECAR_EXTENSION)
    }

    /// Link path relative to the destination root.
    pub fn relative_path(&self) -> PathBuf {
        self.dir.join(self.file_name())
    }
}

/// Episode code, e.g. `S03E07`.
pub fn episode_string(season: u32, episode: u32) -> String {
    format!("S{:02}E{:02}", season, episode)
}

/// Season folder name, e.g. `Season 03`.
pub fn season_string(season: u32) -> String {
    format!("Season {:02}", season)
}

/// Display name, e.g. `Dexter - S03E07 - Easy as Pie`.
pub fn display_name(identity: &ResolvedIdentity) -> String {
    format!(
        "{} - {} - {}",
        identity.show.trim(),
        episode_string(identity.season, identity.episode),
        identity.episode_title.trim()
    )
}

/// Compute the link location for an identity.
///
/// `source` is the recording file; only its extension is used.
pub fn format_link(identity: &ResolvedIdentity, source: &Path) -> LinkName {
    let show = truncate_bytes(&sanitize_segment(&identity.show), MAX_NAME_BYTES);
    let dir = PathBuf::from(show).join(season_string(identity.season));

    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_string);

    // Room for the longer of the link and sidecar suffixes.
    let suffix = extension
        .as_ref()
        .map_or(0, |e| e.len() + 1)
        .max(SIDECAR_EXTENSION.len() + 1);
    let display = truncate_bytes(
        &sanitize_segment(&display_name(identity)),
        MAX_NAME_BYTES.saturating_sub(suffix),
    );

    LinkName {
        dir,
        display,
        extension,
    }
}

/// Make a metadata string safe to use as a single path segment.
pub fn sanitize_segment(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect();

    match cleaned.trim() {
        "" | "." | ".." => EMPTY_SEGMENT.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Cut `s` to at most `max` bytes on a character boundary.
fn truncate_bytes(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }

    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].trim_end().to_string()
}
