//! MythTV Services API client.

use crate::models::config::BackendConfig;
use crate::models::recording::Recording;
use crate::services::RecordingBackend;
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;

/// `Dvr/GetRecordedList` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProgramListResponse {
    program_list: ProgramList,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProgramList {
    #[serde(default)]
    programs: Vec<ProgramDto>,
}

/// `Dvr/GetRecorded` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProgramResponse {
    program: ProgramDto,
}

/// Program as serialized by the Services API.
///
/// Older backends encode every number as a string, newer ones as numbers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProgramDto {
    start_time: DateTime<Utc>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    sub_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    season: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    episode: u32,
    #[serde(default)]
    syndicated_episode: Option<String>,
    #[serde(default)]
    inetref: Option<String>,
    #[serde(default)]
    file_name: String,
    channel: ChannelDto,
    #[serde(default)]
    recording: Option<RecordingInfoDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ChannelDto {
    #[serde(deserialize_with = "lenient_u32")]
    chan_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecordingInfoDto {
    #[serde(default)]
    start_ts: Option<DateTime<Utc>>,
    #[serde(default)]
    rec_group: String,
    #[serde(default)]
    storage_group: Option<String>,
}

/// `Myth/GetStorageGroupDirs` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageGroupDirListResponse {
    storage_group_dir_list: StorageGroupDirList,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageGroupDirList {
    #[serde(default)]
    storage_group_dirs: Vec<StorageGroupDir>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageGroupDir {
    dir_name: PathBuf,
}

/// `Myth/GetHostName` response.
#[derive(Debug, Deserialize)]
struct StringResponse {
    #[serde(rename = "String")]
    value: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(0),
        Some(NumberOrString::Number(n)) => u32::try_from(n).map_err(serde::de::Error::custom),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(0),
        Some(NumberOrString::String(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl ProgramDto {
    fn into_recording(self) -> Recording {
        let (start_ts, rec_group, storage_group) = match self.recording {
            Some(info) => (info.start_ts, info.rec_group, info.storage_group),
            None => (None, String::new(), None),
        };

        Recording {
            chan_id: self.channel.chan_id,
            // Recordings are keyed on the actual recording start, not the
            // scheduled program start.
            start_time: start_ts.unwrap_or(self.start_time),
            title: self.title,
            subtitle: self.sub_title,
            season: self.season,
            episode: self.episode,
            syndicated_episode: self.syndicated_episode,
            inetref: self.inetref,
            rec_group,
            storage_group: storage_group.filter(|g| !g.is_empty()),
            file_name: self.file_name,
        }
    }
}

/// MythTV backend client.
pub struct MythtvClient {
    config: BackendConfig,
    client: reqwest::Client,
    storage_dirs: Mutex<HashMap<String, Vec<PathBuf>>>,
}

impl MythtvClient {
    /// Create a new backend client.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            config,
            client,
            storage_dirs: Mutex::new(HashMap::new()),
        })
    }

    /// Backend base URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.config.url.trim_end_matches('/'), path);
        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    Error::BackendUnreachable(self.config.url.clone())
                } else {
                    Error::Http(e)
                }
            })?;

        if !resp.status().is_success() {
            return Err(Error::Backend(format!("{} returned {}", path, resp.status())));
        }

        Ok(resp.json().await?)
    }

    /// Host name of the backend. Used to verify connectivity.
    pub async fn host_name(&self) -> Result<String> {
        let resp: StringResponse = self.get_json("Myth/GetHostName", &[]).await?;
        Ok(resp.value)
    }

    /// Directories of a storage group, from config or from the backend.
    async fn storage_dirs(&self, group: &str) -> Result<Vec<PathBuf>> {
        if !self.config.storage_dirs.is_empty() {
            return Ok(self.config.storage_dirs.clone());
        }

        let mut cache = self.storage_dirs.lock().await;
        if let Some(dirs) = cache.get(group) {
            return Ok(dirs.clone());
        }

        let resp: StorageGroupDirListResponse = self
            .get_json("Myth/GetStorageGroupDirs", &[("GroupName", group.to_string())])
            .await?;
        let dirs: Vec<PathBuf> = resp
            .storage_group_dir_list
            .storage_group_dirs
            .into_iter()
            .map(|d| d.dir_name)
            .collect();

        tracing::debug!("Storage group {} dirs: {:?}", group, dirs);
        cache.insert(group.to_string(), dirs.clone());
        Ok(dirs)
    }
}

impl RecordingBackend for MythtvClient {
    async fn recordings(&self) -> Result<Vec<Recording>> {
        let resp: ProgramListResponse = self.get_json("Dvr/GetRecordedList", &[]).await?;
        let recordings: Vec<Recording> = resp
            .program_list
            .programs
            .into_iter()
            .map(ProgramDto::into_recording)
            .collect();

        tracing::info!("Backend reports {} recordings", recordings.len());
        Ok(recordings)
    }

    async fn recording(&self, chan_id: u32, start_time: DateTime<Utc>) -> Result<Recording> {
        let start = start_time.to_rfc3339_opts(SecondsFormat::Secs, true);
        let query = [("ChanId", chan_id.to_string()), ("StartTime", start.clone())];

        match self.get_json::<ProgramResponse>("Dvr/GetRecorded", &query).await {
            Ok(resp) => Ok(resp.program.into_recording()),
            Err(Error::Backend(_)) => Err(Error::RecordingNotFound { chan_id, start }),
            Err(e) => Err(e),
        }
    }

    async fn checkfile(&self, recording: &Recording) -> Result<PathBuf> {
        let group = recording
            .storage_group
            .as_deref()
            .unwrap_or(&self.config.storage_group);

        for dir in self.storage_dirs(group).await? {
            let candidate = dir.join(&recording.file_name);
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        Err(Error::CheckfileNotFound(recording.file_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_program_with_string_numbers() {
        let json = r#"{
            "Program": {
                "StartTime": "2024-03-09T20:00:00Z",
                "Title": "Dexter",
                "SubTitle": "Remains to Be Seen",
                "Season": "3",
                "Episode": "7",
                "Inetref": "ttvdb.py_79349",
                "FileName": "1051_20240309195900.ts",
                "Channel": { "ChanId": "1051" },
                "Recording": {
                    "StartTs": "2024-03-09T19:59:00Z",
                    "RecGroup": "Default",
                    "StorageGroup": "Default"
                }
            }
        }"#;

        let resp: ProgramResponse = serde_json::from_str(json).unwrap();
        let rec = resp.program.into_recording();

        assert_eq!(rec.chan_id, 1051);
        assert_eq!(rec.season, 3);
        assert_eq!(rec.episode, 7);
        assert_eq!(rec.start_time, Utc.with_ymd_and_hms(2024, 3, 9, 19, 59, 0).unwrap());
        assert_eq!(rec.rec_group, "Default");
        assert_eq!(rec.inetref.as_deref(), Some("ttvdb.py_79349"));
    }

    #[test]
    fn test_program_list_with_numeric_fields() {
        let json = r#"{
            "ProgramList": {
                "Programs": [
                    {
                        "StartTime": "2024-03-10T18:00:00Z",
                        "Title": "Evening News",
                        "Season": 0,
                        "Episode": 0,
                        "FileName": "1002_20240310180000.ts",
                        "Channel": { "ChanId": 1002 },
                        "Recording": { "RecGroup": "LiveTV" }
                    }
                ]
            }
        }"#;

        let resp: ProgramListResponse = serde_json::from_str(json).unwrap();
        let recs: Vec<Recording> = resp.program_list.programs.into_iter().map(ProgramDto::into_recording).collect();

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].chan_id, 1002);
        assert_eq!(recs[0].season, 0);
        assert_eq!(recs[0].subtitle, None);
        assert_eq!(recs[0].rec_group, "LiveTV");
        assert_eq!(recs[0].start_time, Utc.with_ymd_and_hms(2024, 3, 10, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_empty_string_number_is_zero() {
        let json = r#"{ "ChanId": "" }"#;
        let channel: ChannelDto = serde_json::from_str(json).unwrap();
        assert_eq!(channel.chan_id, 0);
    }
}
