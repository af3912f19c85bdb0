//! Skip list sidecar generator.
//!
//! Format:
//!
//! ```text
//! FILE PROCESSING COMPLETE
//! ------------------------
//! 0 1200
//! 30000 36000
//! ```

use crate::models::skiplist::SkipList;
use std::fs;
use std::path::Path;

/// First header line.
pub const SIDECAR_HEADER: &str = "FILE PROCESSING COMPLETE";

/// Second header line.
pub const SIDECAR_SEPARATOR: &str = "------------------------";

/// Render a skip list as sidecar text.
pub fn render_sidecar(list: &SkipList) -> String {
    let mut out = String::new();
    out.push_str(SIDECAR_HEADER);
    out.push('\n');
    out.push_str(SIDECAR_SEPARATOR);
    out.push('\n');
    for range in &list.ranges {
        out.push_str(&format!("{} {}\n", range.start, range.end));
    }
    out
}

/// Write a sidecar file, replacing any existing one.
pub fn write_sidecar(path: &Path, list: &SkipList) -> std::io::Result<()> {
    fs::write(path, render_sidecar(list))?;
    tracing::debug!("Wrote sidecar {:?} ({} breaks)", path, list.ranges.len());
    Ok(())
}
