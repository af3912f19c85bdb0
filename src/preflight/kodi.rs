//! Kodi preflight check.

use super::CheckResult;
use crate::services::kodi::KodiClient;

/// Check if Kodi answers JSON-RPC.
pub async fn check(client: &KodiClient) -> CheckResult {
    if client.ping().await {
        CheckResult::ok("Kodi", "connected")
    } else {
        CheckResult::warn(
            "Kodi",
            &format!("not reachable at {}", client.url()),
            "Enable Kodi's web server or unset [kodi].url",
        )
    }
}
