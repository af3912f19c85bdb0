//! TheTVDB v4 API client.

use crate::models::config::TvdbConfig;
use crate::services::MetadataProvider;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::OnceCell;

const TVDB_BASE_URL: &str = "https://api4.thetvdb.com/v4";

/// Upper bound on episode pages fetched for one lookup.
const MAX_EPISODE_PAGES: u32 = 20;

/// Every v4 response wraps its payload in `data`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    #[serde(default)]
    links: Option<Links>,
}

/// Pagination links of list endpoints.
#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    apikey: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pin: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

/// Search hit.
#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub tvdb_id: Option<String>,
    pub name: Option<String>,
}

/// Series base record.
#[derive(Debug, Deserialize)]
pub struct SeriesBase {
    pub id: u64,
    pub name: String,
}

/// Series translation.
#[derive(Debug, Deserialize)]
pub struct Translation {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeriesEpisodes {
    #[serde(default)]
    episodes: Vec<EpisodeBase>,
}

/// Episode base record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeBase {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub season_number: Option<u32>,
    pub number: Option<u32>,
}

/// Lookups already answered during this run.
#[derive(Default)]
struct Cache {
    titles: HashMap<String, Option<u64>>,
    names: HashMap<u64, String>,
    episodes: HashMap<(u64, u32, u32), Option<String>>,
}

/// TheTVDB API client.
pub struct TvdbClient {
    api_key: String,
    pin: Option<String>,
    language: String,
    base_url: String,
    client: reqwest::Client,
    token: OnceCell<String>,
    cache: Mutex<Cache>,
}

impl TvdbClient {
    /// Create a new client.
    pub fn new(api_key: String, pin: Option<String>, language: String) -> Self {
        Self {
            api_key,
            pin,
            language,
            base_url: TVDB_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            token: OnceCell::new(),
            cache: Mutex::new(Cache::default()),
        }
    }

    /// Point the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create a client from configuration.
    pub fn from_config(config: &TvdbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(Error::TvdbApiKeyMissing)?;
        Ok(Self::new(api_key, config.pin.clone(), config.language.clone()))
    }

    /// Bearer token, obtained on first use.
    async fn token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                let url = format!("{}/login", self.base_url);
                let body = LoginRequest {
                    apikey: &self.api_key,
                    pin: self.pin.as_deref(),
                };
                let resp = self.client.post(&url).json(&body).send().await?;
                if !resp.status().is_success() {
                    return Err(Error::Tvdb(format!("login failed: {}", resp.status())));
                }
                let login: Envelope<LoginData> = resp.json().await?;
                tracing::debug!("Logged in to TheTVDB");
                Ok::<_, Error>(login.data.token)
            })
            .await?;
        Ok(token.as_str())
    }

    /// GET a v4 endpoint. A 404 is reported as `Ok(None)`.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Option<T>> {
        Ok(self.get_envelope(path, query).await?.map(|e| e.data))
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<Envelope<T>>> {
        let token = self.token().await?;
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Error::Tvdb(format!("{} returned {}", path, resp.status())));
        }

        Ok(Some(resp.json().await?))
    }

    /// Find one episode in default (aired) order.
    ///
    /// The list is filtered server-side; later pages are still followed in
    /// case the filter is not applied.
    pub async fn find_episode(&self, series_id: u64, season: u32, episode: u32) -> Result<Option<EpisodeBase>> {
        let path = format!("series/{}/episodes/default", series_id);

        for page in 0..MAX_EPISODE_PAGES {
            let params = [
                ("page", page.to_string()),
                ("season", season.to_string()),
                ("episodeNumber", episode.to_string()),
            ];
            let Some(envelope) = self.get_envelope::<SeriesEpisodes>(&path, &params).await? else {
                return Ok(None);
            };

            if let Some(found) = envelope
                .data
                .episodes
                .into_iter()
                .find(|e| e.season_number == Some(season) && e.number == Some(episode))
            {
                return Ok(Some(found));
            }

            if envelope.links.and_then(|l| l.next).is_none() {
                break;
            }
        }

        Ok(None)
    }

    /// Verify the API key by logging in.
    pub async fn verify_api_key(&self) -> Result<bool> {
        match self.token().await {
            Ok(_) => Ok(true),
            Err(Error::Tvdb(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Search for series by name.
    pub async fn search_series(&self, query: &str) -> Result<Vec<SearchItem>> {
        let params = [("query", query.to_string()), ("type", "series".to_string())];
        Ok(self.get("search", &params).await?.unwrap_or_default())
    }
}

impl MetadataProvider for TvdbClient {
    async fn lookup_by_title(&self, title: &str) -> Result<Option<u64>> {
        if let Some(hit) = self.cache.lock().map_err(poisoned)?.titles.get(title) {
            return Ok(*hit);
        }

        let results = self.search_series(title).await?;
        let id = results
            .iter()
            .find_map(|item| item.tvdb_id.as_deref().and_then(|id| id.parse::<u64>().ok()));

        tracing::debug!("TheTVDB search {:?} -> {:?}", title, id);
        self.cache
            .lock()
            .map_err(poisoned)?
            .titles
            .insert(title.to_string(), id);
        Ok(id)
    }

    async fn series_name(&self, series_id: u64) -> Result<String> {
        if let Some(name) = self.cache.lock().map_err(poisoned)?.names.get(&series_id) {
            return Ok(name.clone());
        }

        // Prefer the configured language, falling back to the original name.
        let translated: Option<Translation> = self
            .get(&format!("series/{}/translations/{}", series_id, self.language), &[])
            .await
            .unwrap_or(None);

        let name = match translated.and_then(|t| t.name).filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => {
                let base: SeriesBase = self
                    .get(&format!("series/{}", series_id), &[])
                    .await?
                    .ok_or_else(|| Error::Tvdb(format!("series {} not found", series_id)))?;
                base.name
            }
        };

        self.cache
            .lock()
            .map_err(poisoned)?
            .names
            .insert(series_id, name.clone());
        Ok(name)
    }

    async fn episode_title(&self, series_id: u64, season: u32, episode: u32) -> Result<Option<String>> {
        let key = (series_id, season, episode);
        if let Some(title) = self.cache.lock().map_err(poisoned)?.episodes.get(&key) {
            return Ok(title.clone());
        }

        let title = match self.find_episode(series_id, season, episode).await? {
            Some(found) => {
                // Episode names in the list are in the original language.
                let translated = match found.id {
                    Some(id) => self
                        .get::<Translation>(&format!("episodes/{}/translations/{}", id, self.language), &[])
                        .await
                        .unwrap_or(None)
                        .and_then(|t| t.name),
                    None => None,
                };
                translated.or(found.name).filter(|n| !n.is_empty())
            }
            None => None,
        };

        self.cache
            .lock()
            .map_err(poisoned)?
            .episodes
            .insert(key, title.clone());
        Ok(title)
    }
}

/// No provider configured: every show is unresolved.
impl<P: MetadataProvider> MetadataProvider for Option<P> {
    async fn lookup_by_title(&self, title: &str) -> Result<Option<u64>> {
        match self {
            Some(provider) => provider.lookup_by_title(title).await,
            None => Ok(None),
        }
    }

    async fn series_name(&self, series_id: u64) -> Result<String> {
        match self {
            Some(provider) => provider.series_name(series_id).await,
            None => Err(Error::Tvdb("no metadata provider configured".to_string())),
        }
    }

    async fn episode_title(&self, series_id: u64, season: u32, episode: u32) -> Result<Option<String>> {
        match self {
            Some(provider) => provider.episode_title(series_id, season, episode).await,
            None => Ok(None),
        }
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::other("TheTVDB cache lock poisoned")
}
