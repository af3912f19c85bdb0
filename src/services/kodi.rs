//! Kodi JSON-RPC client.

use crate::models::config::KodiConfig;
use crate::services::LibraryScanner;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    id: u32,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Kodi client.
pub struct KodiClient {
    url: String,
    username: Option<String>,
    password: Option<String>,
    client: reqwest::Client,
}

impl KodiClient {
    /// Create a client, or `None` when Kodi is not configured.
    pub fn from_config(config: &KodiConfig) -> Result<Option<Self>> {
        let Some(url) = config.url.clone().filter(|u| !u.is_empty()) else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Some(Self {
            url,
            username: config.username.clone(),
            password: config.password.clone(),
            client,
        }))
    }

    /// Kodi base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call a JSON-RPC method without parameters.
    pub async fn call(&self, method: &str) -> Result<()> {
        let url = format!("{}/jsonrpc", self.url.trim_end_matches('/'));
        let mut request = self.client.post(&url).json(&RpcRequest {
            jsonrpc: "2.0",
            method,
            id: 1,
        });
        if let Some(ref username) = self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let resp = request.send().await?.error_for_status()?;
        let body: RpcResponse = resp.json().await?;
        if let Some(err) = body.error {
            return Err(Error::other(format!(
                "Kodi {} failed ({}): {}",
                method, err.code, err.message
            )));
        }

        tracing::debug!("Kodi {} sent", method);
        Ok(())
    }

    /// Check if Kodi answers `JSONRPC.Ping`.
    pub async fn ping(&self) -> bool {
        self.call("JSONRPC.Ping").await.is_ok()
    }
}

impl LibraryScanner for KodiClient {
    async fn scan(&self) -> Result<()> {
        self.call("VideoLibrary.Scan").await
    }

    async fn clean(&self) -> Result<()> {
        self.call("VideoLibrary.Clean").await
    }
}

/// Tell the library about changes. Failures are logged, never returned.
pub async fn notify_library<L: LibraryScanner>(scanner: &L) {
    if let Err(e) = scanner.scan().await {
        tracing::warn!("Library scan request failed: {}", e);
    }
    if let Err(e) = scanner.clean().await {
        tracing::warn!("Library clean request failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_is_none() {
        let client = KodiClient::from_config(&KodiConfig::default()).unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn test_request_shape() {
        let json = serde_json::to_value(RpcRequest {
            jsonrpc: "2.0",
            method: "VideoLibrary.Scan",
            id: 1,
        })
        .unwrap();
        assert_eq!(json["method"], "VideoLibrary.Scan");
        assert_eq!(json["jsonrpc"], "2.0");
    }

    #[test]
    fn test_error_response() {
        let body: RpcResponse =
            serde_json::from_str(r#"{"id":1,"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found."}}"#)
                .unwrap();
        assert_eq!(body.error.unwrap().code, -32601);
    }
}
