//! Commercial detector preflight check.

use super::CheckResult;
use crate::services::skiplist::{self, CommandSkipList};

/// Check if the skip list program is installed.
pub fn check(source: &CommandSkipList) -> CheckResult {
    if skiplist::is_installed(source.program()) {
        CheckResult::ok("Skip list", &format!("{} installed", source.program()))
    } else {
        CheckResult::warn(
            "Skip list",
            &format!("{} not found, sidecars will be skipped", source.program()),
            "Install mythtv-backend or set [skiplist].program",
        )
    }
}
