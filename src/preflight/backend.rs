//! MythTV backend preflight check.

use super::CheckResult;
use crate::services::mythtv::MythtvClient;

/// Check if the backend answers.
pub async fn check(client: &MythtvClient) -> CheckResult {
    match client.host_name().await {
        Ok(host) => CheckResult::ok("MythTV backend", &format!("connected ({})", host)),
        Err(e) => CheckResult::fail(
            "MythTV backend",
            &format!("unreachable at {}: {}", client.url(), e),
            "Check [backend].url and that mythbackend is running",
        ),
    }
}
