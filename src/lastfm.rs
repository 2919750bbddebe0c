use reqwest::Url;
use serde::Deserialize;

use crate::constant::LASTFM_API_ENDPOINT;
use crate::model::Track;

#[derive(Debug, Deserialize)]
struct GetInfoResponse {
    track: GetInfoTrack,
}

#[derive(Debug, Deserialize)]
struct GetInfoTrack {
    playcount: Option<String>,
}

/// Fetches play-count metadata used purely for `#ORDER BY LASTFM`.
/// Modeled on the `ws.audioscrobbler.com` `track.getInfo` client shape.
pub struct LastFm {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl LastFm {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Url::parse(LASTFM_API_ENDPOINT).unwrap(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Calls `track.getInfo(artist, title)`; on success, stores
    /// `playcount`. On any failure, `playcount` stays at -1. This
    /// is a soft failure, never propagated.
    pub async fn annotate(&self, track: &mut Track) {
        let artist = track.primary_artist().to_string();
        let title = track.title().to_string();
        if artist.is_empty() || title.is_empty() {
            return;
        }

        match self.get_info(&artist, &title).await {
            Ok(playcount) => track.playcount = playcount,
            Err(err) => {
                tracing::warn!("last.fm getInfo failed for {artist} - {title}: {err:#}");
            }
        }
    }

    async fn get_info(&self, artist: &str, title: &str) -> anyhow::Result<i64> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("method", "track.getInfo")
            .append_pair("api_key", &self.api_key)
            .append_pair("artist", artist)
            .append_pair("track", title)
            .append_pair("format", "json");

        let response = self
            .client
            .get(url)
            .send()
            .await?
            .json::<GetInfoResponse>()
            .await?;

        let playcount = response
            .track
            .playcount
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(-1);

        Ok(playcount)
    }
}
