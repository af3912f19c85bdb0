//! TheTVDB preflight check.

use super::CheckResult;
use crate::services::tvdb::TvdbClient;

/// Check if TheTVDB is configured and accepts the key.
pub async fn check(client: Option<&TvdbClient>) -> CheckResult {
    let Some(client) = client else {
        return CheckResult::warn(
            "TheTVDB",
            "API key not configured, shows will use backend titles",
            "Set TVDB_API_KEY environment variable",
        );
    };

    match client.verify_api_key().await {
        Ok(true) => CheckResult::ok("TheTVDB", "connected"),
        Ok(false) => CheckResult::warn(
            "TheTVDB",
            "invalid API key",
            "Check your TVDB_API_KEY environment variable",
        ),
        Err(_) => CheckResult::warn(
            "TheTVDB",
            "connection failed",
            "Check your network connection",
        ),
    }
}
