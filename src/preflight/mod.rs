//! Preflight checks module.
//!
//! Only the backend is required. Every other collaborator degrades the run
//! (unresolved names, no sidecars, no rescan) and is reported as a warning.

mod backend;
mod kodi;
mod skiplist;
mod tvdb;

use crate::services::kodi::KodiClient;
use crate::services::mythtv::MythtvClient;
use crate::services::skiplist::CommandSkipList;
use crate::services::tvdb::TvdbClient;
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    /// Whether a failure stops the run.
    pub required: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            required: false,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            required: true,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    pub fn warn(name: &str, message: &str, hint: &str) -> Self {
        Self {
            required: false,
            ..Self::fail(name, message, hint)
        }
    }
}

/// Collaborators to check. `None` entries are disabled and not checked.
pub struct Collaborators<'a> {
    pub backend: &'a MythtvClient,
    pub tvdb: Option<&'a TvdbClient>,
    pub skiplist: Option<&'a CommandSkipList>,
    pub kodi: Option<&'a KodiClient>,
}

/// Run all preflight checks.
pub async fn run_preflight_checks(collaborators: &Collaborators<'_>) -> Vec<CheckResult> {
    let mut results = Vec::new();

    results.push(backend::check(collaborators.backend).await);
    results.push(tvdb::check(collaborators.tvdb).await);

    if let Some(skiplist) = collaborators.skiplist {
        results.push(skiplist::check(skiplist));
    }

    if let Some(kodi) = collaborators.kodi {
        results.push(kodi::check(kodi).await);
    }

    results
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            let tag = if result.required {
                "[FAIL]".red()
            } else {
                "[WARN]".yellow()
            };
            println!("{} {}: {}", tag, result.name.bold(), result.message);
            if let Some(ref hint) = result.hint {
                println!("  {} {}", "->".yellow(), hint);
            }
        }
    }
}

/// Check if every required check passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success || !r.required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_do_not_fail() {
        let results = vec![
            CheckResult::ok("MythTV backend", "connected"),
            CheckResult::warn("TheTVDB", "not configured", "Set TVDB_API_KEY"),
        ];
        assert!(all_passed(&results));
    }

    #[test]
    fn test_required_failure() {
        let results = vec![CheckResult::fail("MythTV backend", "unreachable", "Start mythbackend")];
        assert!(!all_passed(&results));
    }
}
