//! Commercial skip list extraction via `mythutil`.

use crate::error::SkipListError;
use crate::models::config::SkipListConfig;
use crate::models::recording::Recording;
use crate::models::skiplist::{SkipList, SkipRange};
use crate::services::SkipListSource;
use regex::Regex;
use std::sync::OnceLock;
use tokio::process::Command;

/// Prefix of the line carrying the skip list.
pub const SKIPLIST_PREFIX: &str = "Commercial Skip List: ";

/// Runs an external command that prints a skip list for a recording.
pub struct CommandSkipList {
    program: String,
    args: Vec<String>,
}

impl CommandSkipList {
    pub fn new(config: &SkipListConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    /// Program name, for preflight checks.
    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Check if a program can be started.
pub fn is_installed(program: &str) -> bool {
    std::process::Command::new(program)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

impl SkipListSource for CommandSkipList {
    async fn skip_list(&self, recording: &Recording) -> Result<SkipList, SkipListError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--chanid")
            .arg(recording.chan_id.to_string())
            .arg("--starttime")
            .arg(recording.start_timestamp())
            .output()
            .await
            .map_err(|source| SkipListError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SkipListError::ExitStatus {
                program: self.program.clone(),
                status: output.status.to_string(),
            });
        }

        parse_skip_list(&String::from_utf8_lossy(&output.stdout))
    }
}

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*-\s*(\d+)$").expect("valid skip range regex"))
}

/// Parse detector output of the form `Commercial Skip List: 0-1200,30000-36000`.
///
/// Log noise before the skip list line is ignored. An empty payload is a
/// recording without commercial breaks.
pub fn parse_skip_list(output: &str) -> Result<SkipList, SkipListError> {
    let marker = SKIPLIST_PREFIX.trim_end();
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with(marker))
        .ok_or_else(|| SkipListError::Malformed(format!("no {:?} line", marker)))?;

    let payload = line[marker.len()..].trim();
    let mut ranges = Vec::new();

    for entry in payload.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let caps = range_regex()
            .captures(entry)
            .ok_or_else(|| SkipListError::Malformed(format!("bad range {:?}", entry)))?;

        let start = caps[1]
            .parse()
            .map_err(|_| SkipListError::Malformed(format!("bad start in {:?}", entry)))?;
        let end = caps[2]
            .parse()
            .map_err(|_| SkipListError::Malformed(format!("bad end in {:?}", entry)))?;
        ranges.push(SkipRange { start, end });
    }

    Ok(SkipList { ranges })
}
