//! Command line argument definitions.

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

/// mythlink - Link MythTV recordings into a Show/Season/Episode tree
#[derive(Parser, Debug)]
#[command(name = "mythlink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory for the links.
    ///
    /// WARNING: a full resync removes ALL symlinks and .txt sidecars within
    /// the destination directory and its subdirectories.
    #[arg(long, value_name = "PATH")]
    pub dest: Option<PathBuf>,

    /// Link only the recording on this channel (use with --starttime)
    #[arg(long, value_name = "CHANID", requires = "starttime")]
    pub chanid: Option<u32>,

    /// Start time of the recording to link (use with --chanid).
    /// Accepts YYYYMMDDHHMMSS (UTC), RFC 3339, or unix seconds.
    #[arg(long, value_name = "STARTTIME", requires = "chanid", value_parser = parse_start_time)]
    pub starttime: Option<DateTime<Utc>>,

    /// Link all recordings, even those not known to TheTVDB
    #[arg(long)]
    pub all: bool,

    /// Do not write commercial skip list sidecars
    #[arg(long)]
    pub no_skiplist: bool,

    /// Do not ask Kodi to rescan its library
    #[arg(long)]
    pub no_scan: bool,

    /// Concurrent link jobs during a full resync
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Configuration file (default: ~/.config/mythlink/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long)]
    pub skip_preflight: bool,
}

/// What a run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Link exactly one recording.
    Single {
        chan_id: u32,
        start_time: DateTime<Utc>,
    },
    /// Purge and rebuild the whole tree.
    Resync,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match (self.chanid, self.starttime) {
            (Some(chan_id), Some(start_time)) => Mode::Single { chan_id, start_time },
            _ => Mode::Resync,
        }
    }
}

/// Parse a recording start time.
pub fn parse_start_time(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();

    if s.len() == 14 && s.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S")
            .map(|dt| dt.and_utc())
            .map_err(|e| format!("invalid start time {:?}: {}", s, e));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    s.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| format!("invalid start time {:?}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_mythtv_timestamp() {
        assert_eq!(
            parse_start_time("20240309195900").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 9, 19, 59, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_epoch_and_rfc3339() {
        assert_eq!(
            parse_start_time("1710014340").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 9, 19, 59, 0).unwrap()
        );
        assert_eq!(
            parse_start_time("2024-03-09T19:59:00Z").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 9, 19, 59, 0).unwrap()
        );
        assert!(parse_start_time("yesterday").is_err());
    }

    #[test]
    fn test_chanid_requires_starttime() {
        let result = Cli::try_parse_from(["mythlink", "--dest", "/tv", "--chanid", "1051"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mode() {
        let cli = Cli::try_parse_from([
            "mythlink",
            "--dest",
            "/tv",
            "--chanid",
            "1051",
            "--starttime",
            "20240309195900",
        ])
        .unwrap();
        assert!(matches!(cli.mode(), Mode::Single { chan_id: 1051, .. }));

        let cli = Cli::try_parse_from(["mythlink", "--dest", "/tv", "--all"]).unwrap();
        assert_eq!(cli.mode(), Mode::Resync);
        assert!(cli.all);
    }
}
