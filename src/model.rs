use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static TRACK_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+:track:([A-Za-z0-9]+)$").unwrap());

/// Pulls a track id out of either a `<scheme>:track:<id>` URI or a
/// `https?://<host>/.../track/<id>` web link. Returns `None` for
/// anything else, including plain search queries.
pub fn extract_track_id(text: &str) -> Option<String> {
    let text = text.trim();
    if let Some(caps) = TRACK_URI_RE.captures(text) {
        return Some(caps[1].to_string());
    }
    if text.starts_with("http://") || text.starts_with("https://") {
        let segments: Vec<&str> = text.split('/').collect();
        if segments.len() >= 5 && segments[3] == "track" {
            let raw = segments[4];
            let id = raw.split(['?', '#']).next().unwrap_or(raw);
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    }
    None
}

pub fn looks_like_track_ref(text: &str) -> bool {
    extract_track_id(text).is_some()
}

/// Metadata carried by a resolved track. Shared between the "simple" and
/// "full" response stages; `popularity` only means anything on a full
/// response (see `TrackResponse`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMeta {
    pub id: String,
    pub uri: String,
    pub title: String,
    pub primary_artist: String,
    pub all_artists: Vec<String>,
    pub album_name: String,
    pub popularity: i64,
}

impl TrackMeta {
    fn from_raw(raw: &RawTrack) -> Self {
        let all_artists: Vec<String> = raw
            .artists
            .iter()
            .flatten()
            .map(|a| a.name.clone())
            .collect();
        Self {
            id: raw.id.clone().unwrap_or_default(),
            uri: raw.uri.clone().unwrap_or_default(),
            title: raw.name.clone().unwrap_or_default(),
            primary_artist: all_artists.first().cloned().unwrap_or_default(),
            all_artists,
            album_name: raw.album.as_ref().map(|a| a.name.clone()).unwrap_or_default(),
            popularity: raw.popularity.unwrap_or(-1),
        }
    }
}

/// A track's resolution stage (DESIGN NOTES: two-stage track responses).
///
/// `Simple` tracks come from a search hit or an album listing and lack
/// popularity; `Full` tracks come from a direct `/tracks/<id>` fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackResponse {
    Unresolved,
    Simple(TrackMeta),
    Full(TrackMeta),
}

#[derive(Debug, Clone)]
pub struct Track {
    pub entry_text: String,
    pub response: TrackResponse,
    pub playcount: i64,
}

impl Track {
    pub fn unresolved(entry_text: impl Into<String>) -> Self {
        Self {
            entry_text: entry_text.into(),
            response: TrackResponse::Unresolved,
            playcount: -1,
        }
    }

    pub fn simple(entry_text: impl Into<String>, meta: TrackMeta) -> Self {
        Self {
            entry_text: entry_text.into(),
            response: TrackResponse::Simple(meta),
            playcount: -1,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self.response, TrackResponse::Full(_))
    }

    pub fn meta(&self) -> Option<&TrackMeta> {
        match &self.response {
            TrackResponse::Unresolved => None,
            TrackResponse::Simple(m) | TrackResponse::Full(m) => Some(m),
        }
    }

    pub fn id(&self) -> &str {
        self.meta().map(|m| m.id.as_str()).unwrap_or("")
    }

    pub fn uri(&self) -> &str {
        self.meta().map(|m| m.uri.as_str()).unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.meta().map(|m| m.title.as_str()).unwrap_or("")
    }

    pub fn primary_artist(&self) -> &str {
        self.meta().map(|m| m.primary_artist.as_str()).unwrap_or("")
    }

    pub fn all_artists(&self) -> &[String] {
        self.meta().map(|m| m.all_artists.as_slice()).unwrap_or(&[])
    }

    pub fn album_name(&self) -> &str {
        self.meta().map(|m| m.album_name.as_str()).unwrap_or("")
    }

    /// Meaningful only for fully-realized tracks; -1 otherwise.
    pub fn popularity(&self) -> i64 {
        match &self.response {
            TrackResponse::Full(m) => m.popularity,
            _ => -1,
        }
    }

    pub fn promote_to_full(&mut self, meta: TrackMeta) {
        self.response = TrackResponse::Full(meta);
    }

    /// Falls back to `entry_text` when unresolved, matching the source's
    /// equality quirk (DESIGN NOTES, open question 4): two unresolved
    /// tracks with the same query string compare equal.
    pub fn display_key(&self) -> String {
        let uri = self.uri();
        if uri.is_empty() {
            self.entry_text.clone()
        } else {
            uri.to_string()
        }
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.display_key().to_lowercase() == other.display_key().to_lowercase()
    }
}

impl Eq for Track {}

// --- wire shapes -------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct Items<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchTracksResponse {
    pub tracks: Items<RawTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchAlbumsResponse {
    pub albums: Items<RawAlbum>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchArtistsResponse {
    pub artists: Items<RawArtist>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawArtistRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAlbumRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTrack {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<RawArtistRef>>,
    pub album: Option<RawAlbumRef>,
    pub popularity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAlbum {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAlbumFull {
    pub tracks: Items<RawTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawArtist {
    pub id: Option<String>,
}

impl RawTrack {
    pub(crate) fn to_meta(&self) -> TrackMeta {
        TrackMeta::from_raw(self)
    }
}
