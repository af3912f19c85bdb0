//! Identity resolver.
//!
//! Maps a recording to its canonical show, season, episode and episode
//! title. Metadata provider failures never propagate: they degrade the
//! identity to the backend's own fields.

use crate::models::identity::ResolvedIdentity;
use crate::models::recording::Recording;
use crate::services::MetadataProvider;

/// Inetref grabber tags whose suffix is a TheTVDB series ID.
pub const PROVIDER_TAGS: &[&str] = &["ttvdb.py_", "ttvdb4.py_"];

/// Extract the TheTVDB series ID from an inetref such as `ttvdb.py_79349`.
pub fn inetref_series_id(inetref: &str) -> Option<u64> {
    PROVIDER_TAGS
        .iter()
        .find_map(|tag| inetref.strip_prefix(tag))
        .and_then(|id| id.trim().parse().ok())
}

/// Decode a syndicated episode code shaped like `E<episode>S<season>`.
///
/// The first character is skipped and the rest split on `S`. Returns
/// `(season, episode)`, or `None` when the code does not have that shape.
pub fn decode_syndicated_episode(code: &str) -> Option<(u32, u32)> {
    let rest: String = code.chars().skip(1).collect();
    let mut parts = rest.split('S');
    let episode = parts.next()?.parse().ok()?;
    let season = parts.next()?.parse().ok()?;
    Some((season, episode))
}

/// Season and episode of a recording.
///
/// A season of 0 with no syndicated code is an unclassifiable special and
/// always yields `(0, 0)`.
pub fn episode_number(recording: &Recording) -> (u32, u32) {
    if recording.season != 0 {
        return (recording.season, recording.episode);
    }

    match recording.syndicated_episode() {
        None => (0, 0),
        Some(code) => decode_syndicated_episode(code).unwrap_or_else(|| {
            tracing::warn!(
                "Cannot decode syndicated episode {:?} for {}",
                code,
                recording.key()
            );
            (0, 0)
        }),
    }
}

/// Resolves recordings against a metadata provider.
pub struct Resolver<P> {
    provider: P,
}

impl<P: MetadataProvider> Resolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Series ID for a recording, from its inetref or a title search.
    pub async fn series_id(&self, recording: &Recording) -> Option<u64> {
        if let Some(id) = recording.inetref.as_deref().and_then(inetref_series_id) {
            return Some(id);
        }

        match self.provider.lookup_by_title(&recording.title).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Series lookup for {:?} failed: {}", recording.title, e);
                None
            }
        }
    }

    /// Resolve the full identity of a recording.
    pub async fn resolve(&self, recording: &Recording) -> ResolvedIdentity {
        let series_id = self.series_id(recording).await;
        let (season, episode) = episode_number(recording);

        let show = match series_id {
            Some(id) => match self.provider.series_name(id).await {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!("Series name for {} failed: {}", id, e);
                    recording.title.clone()
                }
            },
            None => recording.title.clone(),
        };

        let provider_title = match series_id {
            Some(id) => match self.provider.episode_title(id, season, episode).await {
                Ok(title) => title,
                Err(e) => {
                    tracing::warn!(
                        "Episode title for {} S{:02}E{:02} failed: {}",
                        id,
                        season,
                        episode,
                        e
                    );
                    None
                }
            },
            None => None,
        };

        let episode_title = provider_title
            .or_else(|| recording.subtitle().map(str::to_string))
            .unwrap_or_default();

        tracing::debug!(
            "Resolved {} -> {:?} S{:02}E{:02} {:?}",
            recording.key(),
            show,
            season,
            episode,
            episode_title
        );

        ResolvedIdentity {
            show,
            series_id,
            season,
            episode,
            episode_title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inetref_series_id() {
        assert_eq!(inetref_series_id("ttvdb.py_79349"), Some(79349));
        assert_eq!(inetref_series_id("ttvdb4.py_79349"), Some(79349));
        assert_eq!(inetref_series_id("tmdb3.py_1399"), None);
        assert_eq!(inetref_series_id("ttvdb.py_"), None);
        assert_eq!(inetref_series_id("79349"), None);
    }

    #[test]
    fn test_decode_syndicated_episode() {
        assert_eq!(decode_syndicated_episode("X7S3"), Some((3, 7)));
        assert_eq!(decode_syndicated_episode("E12S4"), Some((4, 12)));
        assert_eq!(decode_syndicated_episode("E7"), None);
        assert_eq!(decode_syndicated_episode("EaSb"), None);
        assert_eq!(decode_syndicated_episode(""), None);
    }

    #[test]
    fn test_special_without_syndicated_code() {
        let rec = Recording {
            season: 0,
            episode: 9,
            ..Default::default()
        };
        assert_eq!(episode_number(&rec), (0, 0));
    }

    #[test]
    fn test_syndicated_fallback() {
        let rec = Recording {
            season: 0,
            episode: 0,
            syndicated_episode: Some("E7S3".to_string()),
            ..Default::default()
        };
        assert_eq!(episode_number(&rec), (3, 7));
    }

    #[test]
    fn test_native_numbering_wins() {
        let rec = Recording {
            season: 2,
            episode: 5,
            syndicated_episode: Some("E7S3".to_string()),
            ..Default::default()
        };
        assert_eq!(episode_number(&rec), (2, 5));
    }

    #[test]
    fn test_malformed_syndicated_code_is_special() {
        let rec = Recording {
            season: 0,
            episode: 4,
            syndicated_episode: Some("garbage".to_string()),
            ..Default::default()
        };
        assert_eq!(episode_number(&rec), (0, 0));
    }
}
