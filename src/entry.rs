use async_trait::async_trait;
use serde_json::Value;

use crate::gateway::Gateway;
use crate::model::{
    extract_track_id, looks_like_track_ref, RawAlbum, RawAlbumFull, RawTrack,
    SearchAlbumsResponse, SearchArtistsResponse, SearchTracksResponse, Track, TrackMeta,
};
use crate::queue::{Nested, Queue};

/// One parsed line of the input program: a free-text track
/// query, an album expansion, or an artist expansion.
#[derive(Debug, Clone)]
pub enum Entry {
    Track(Track),
    Album(AlbumEntry),
    Artist(ArtistEntry),
}

impl Entry {
    pub fn entry_text(&self) -> &str {
        match self {
            Entry::Track(t) => &t.entry_text,
            Entry::Album(a) => &a.entry_text,
            Entry::Artist(a) => &a.entry_text,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlbumEntry {
    pub entry_text: String,
    album_id: Option<String>,
}

impl AlbumEntry {
    pub fn new(entry_text: impl Into<String>) -> Self {
        Self {
            entry_text: entry_text.into(),
            album_id: None,
        }
    }

    /// Built from an artist's album listing, where the id is already known
    /// and no search round-trip is needed.
    pub(crate) fn with_id(entry_text: impl Into<String>, album_id: impl Into<String>) -> Self {
        Self {
            entry_text: entry_text.into(),
            album_id: Some(album_id.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArtistEntry {
    pub entry_text: String,
}

impl ArtistEntry {
    pub fn new(entry_text: impl Into<String>) -> Self {
        Self {
            entry_text: entry_text.into(),
        }
    }
}

/// Uniform expansion contract: every entry variant turns itself
/// into zero or more concrete tracks, wrapped so `Queue::flatten` can
/// collapse the recursive Artist -> Album -> Track structure.
#[async_trait]
pub trait Expand {
    async fn expand(self, gateway: &Gateway) -> Queue<Nested<Track>>;
}

#[async_trait]
impl Expand for Track {
    async fn expand(mut self, gateway: &Gateway) -> Queue<Nested<Track>> {
        if self.is_full() {
            return Queue::from_vec(vec![Nested::Leaf(self)]);
        }

        let needs_direct_fetch = self.meta().is_some() || looks_like_track_ref(&self.entry_text);
        if needs_direct_fetch {
            let id = match self.meta().map(|m| m.id.clone()) {
                Some(id) if !id.is_empty() => Some(id),
                _ => extract_track_id(&self.entry_text),
            };
            if let Some(id) = id {
                match gateway.get(&format!("tracks/{id}"), &[]).await {
                    Ok(body) => {
                        if let Some(meta) = parse_raw_track(&body) {
                            self.promote_to_full(meta);
                        }
                    }
                    Err(err) => {
                        tracing::warn!("failed to fetch track {id}: {err:#}");
                        return Queue::new();
                    }
                }
            }
            return Queue::from_vec(vec![Nested::Leaf(self)]);
        }

        match gateway
            .get("search", &[("type", "track"), ("q", &self.entry_text)])
            .await
        {
            Ok(body) => match serde_json::from_value::<SearchTracksResponse>(body) {
                Ok(parsed) => match parsed.tracks.items.first() {
                    Some(hit) if hit.uri.is_some() => {
                        self.response = crate::model::TrackResponse::Simple(hit.to_meta());
                    }
                    _ => {
                        tracing::warn!("COULD NOT FIND {}", self.entry_text);
                    }
                },
                Err(err) => tracing::warn!("malformed search response: {err:#}"),
            },
            Err(err) => tracing::warn!("track search failed for '{}': {err:#}", self.entry_text),
        }

        Queue::from_vec(vec![Nested::Leaf(self)])
    }
}

#[async_trait]
impl Expand for AlbumEntry {
    async fn expand(mut self, gateway: &Gateway) -> Queue<Nested<Track>> {
        if self.album_id.is_none() {
            match gateway
                .get("search", &[("type", "album"), ("q", &self.entry_text)])
                .await
            {
                Ok(body) => match serde_json::from_value::<SearchAlbumsResponse>(body) {
                    Ok(parsed) => match parsed.albums.items.into_iter().find_map(|a| a.id) {
                        Some(id) => self.album_id = Some(id),
                        None => {
                            tracing::warn!("COULD NOT FIND {}", self.entry_text);
                            return Queue::new();
                        }
                    },
                    Err(err) => {
                        tracing::warn!("malformed album search response: {err:#}");
                        return Queue::new();
                    }
                },
                Err(err) => {
                    tracing::warn!("album search failed for '{}': {err:#}", self.entry_text);
                    return Queue::new();
                }
            }
        }

        let album_id = match &self.album_id {
            Some(id) => id.clone(),
            None => return Queue::new(),
        };

        let body = match gateway.get(&format!("albums/{album_id}"), &[]).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("failed to fetch album {album_id}: {err:#}");
                return Queue::new();
            }
        };

        let full: RawAlbumFull = match serde_json::from_value(body) {
            Ok(full) => full,
            Err(err) => {
                tracing::warn!("malformed album response for {album_id}: {err:#}");
                return Queue::new();
            }
        };

        full.tracks
            .items
            .iter()
            .map(|raw| Nested::Leaf(Track::simple(self.entry_text.clone(), raw.to_meta())))
            .collect()
    }
}

#[async_trait]
impl Expand for ArtistEntry {
    async fn expand(self, gateway: &Gateway) -> Queue<Nested<Track>> {
        let artist_id = match gateway
            .get("search", &[("type", "artist"), ("q", &self.entry_text)])
            .await
        {
            Ok(body) => match serde_json::from_value::<SearchArtistsResponse>(body) {
                Ok(parsed) => match parsed.artists.items.into_iter().find_map(|a| a.id) {
                    Some(id) => id,
                    None => {
                        tracing::warn!("COULD NOT FIND {}", self.entry_text);
                        return Queue::new();
                    }
                },
                Err(err) => {
                    tracing::warn!("malformed artist search response: {err:#}");
                    return Queue::new();
                }
            },
            Err(err) => {
                tracing::warn!("artist search failed for '{}': {err:#}", self.entry_text);
                return Queue::new();
            }
        };

        let body = match gateway
            .get(&format!("artists/{artist_id}/albums"), &[])
            .await
        {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("failed to fetch albums for artist {artist_id}: {err:#}");
                return Queue::new();
            }
        };

        let albums: Vec<RawAlbum> = match serde_json::from_value::<crate::model::Items<RawAlbum>>(body) {
            Ok(items) => items.items,
            Err(err) => {
                tracing::warn!("malformed artist albums response for {artist_id}: {err:#}");
                return Queue::new();
            }
        };

        let album_entries: Queue<AlbumEntry> = albums
            .into_iter()
            .filter_map(|a| a.id)
            .map(|id| AlbumEntry::with_id(self.entry_text.clone(), id))
            .collect();

        let expanded: Queue<Queue<Nested<Track>>> = album_entries
            .resolve_all(|album| async move { Ok(album.expand(gateway).await) })
            .await;

        expanded.map(Nested::Queue)
    }
}

fn parse_raw_track(body: &Value) -> Option<TrackMeta> {
    serde_json::from_value::<RawTrack>(body.clone())
        .ok()
        .map(|raw| raw.to_meta())
}

/// Promotes a simple-response track to full via `/tracks/<id>`, leaving
/// full and unresolved tracks untouched. Used by `#ORDER BY POPULARITY`
/// and `#GROUP BY ALBUM`, which both need popularity/album data that only
/// a full response carries.
pub async fn refresh_to_full(track: Track, gateway: &Gateway) -> Track {
    let id = match &track.response {
        crate::model::TrackResponse::Simple(meta) if !meta.id.is_empty() => meta.id.clone(),
        _ => return track,
    };

    match gateway.get(&format!("tracks/{id}"), &[]).await {
        Ok(body) => {
            let mut track = track;
            if let Some(meta) = parse_raw_track(&body) {
                track.promote_to_full(meta);
            }
            track
        }
        Err(err) => {
            tracing::warn!("failed to refresh track {id}: {err:#}");
            track
        }
    }
}

#[async_trait]
impl Expand for Entry {
    async fn expand(self, gateway: &Gateway) -> Queue<Nested<Track>> {
        match self {
            Entry::Track(track) => track.expand(gateway).await,
            Entry::Album(album) => album.expand(gateway).await,
            Entry::Artist(artist) => artist.expand(gateway).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::spawn_mock_server;
    use std::time::Duration;

    #[tokio::test]
    async fn album_entry_without_id_searches_then_fetches() {
        let base = spawn_mock_server(
            2,
            vec![
                ("/search", r#"{"albums":{"items":[{"id":"alb1"}]}}"#.to_string()),
                (
                    "/albums/alb1",
                    r#"{"tracks":{"items":[{"id":"t1","uri":"spotify:track:track1aaaaaaaaaaaaaaaaa","name":"Song","artists":[{"name":"A"}],"album":{"name":"Alb"}}]}}"#.to_string(),
                ),
            ],
        )
        .await;
        let gateway = Gateway::new(base, Duration::from_millis(1)).unwrap();

        let tracks = AlbumEntry::new("Kid A").expand(&gateway).await.flatten();

        assert_eq!(tracks.size(), 1);
        assert_eq!(tracks.get(0).unwrap().uri(), "spotify:track:track1aaaaaaaaaaaaaaaaa");
    }

    #[tokio::test]
    async fn album_entry_with_known_id_skips_the_search_round_trip() {
        let base = spawn_mock_server(
            1,
            vec![(
                "/albums/alb1",
                r#"{"tracks":{"items":[{"id":"t1","uri":"spotify:track:track1aaaaaaaaaaaaaaaaa","name":"Song","artists":[{"name":"A"}],"album":{"name":"Alb"}}]}}"#.to_string(),
            )],
        )
        .await;
        let gateway = Gateway::new(base, Duration::from_millis(1)).unwrap();

        let tracks = AlbumEntry::with_id("Kid A", "alb1")
            .expand(&gateway)
            .await
            .flatten();

        assert_eq!(tracks.size(), 1);
        assert_eq!(tracks.get(0).unwrap().uri(), "spotify:track:track1aaaaaaaaaaaaaaaaa");
    }

    #[tokio::test]
    async fn artist_entry_expands_through_every_one_of_its_albums() {
        let base = spawn_mock_server(
            4,
            vec![
                (
                    "/search",
                    r#"{"artists":{"items":[{"id":"artist1"}]}}"#.to_string(),
                ),
                (
                    "/artists/artist1/albums",
                    r#"{"items":[{"id":"alb1"},{"id":"alb2"}]}"#.to_string(),
                ),
                (
                    "/albums/alb1",
                    r#"{"tracks":{"items":[{"id":"t1","uri":"spotify:track:track1aaaaaaaaaaaaaaaaa","name":"One","artists":[{"name":"Radiohead"}],"album":{"name":"Kid A"}}]}}"#.to_string(),
                ),
                (
                    "/albums/alb2",
                    r#"{"tracks":{"items":[{"id":"t2","uri":"spotify:track:track2bbbbbbbbbbbbbbbbb","name":"Two","artists":[{"name":"Radiohead"}],"album":{"name":"Amnesiac"}}]}}"#.to_string(),
                ),
            ],
        )
        .await;
        let gateway = Gateway::new(base, Duration::from_millis(1)).unwrap();

        let tracks = ArtistEntry::new("Radiohead")
            .expand(&gateway)
            .await
            .flatten();

        assert_eq!(
            tracks.into_vec().iter().map(Track::uri).collect::<Vec<_>>(),
            vec!["spotify:track:track1aaaaaaaaaaaaaaaaa", "spotify:track:track2bbbbbbbbbbbbbbbbb"]
        );
    }

    #[tokio::test]
    async fn track_entry_promotes_to_full_via_direct_id_fetch() {
        let base = spawn_mock_server(
            1,
            vec![(
                "/tracks/abc123def456ghi789jkl0",
                r#"{"id":"abc123def456ghi789jkl0","uri":"spotify:track:abc123def456ghi789jkl0","name":"Song","artists":[{"name":"A"}],"album":{"name":"Alb"},"popularity":42}"#.to_string(),
            )],
        )
        .await;
        let gateway = Gateway::new(base, Duration::from_millis(1)).unwrap();

        let tracks = Track::unresolved("spotify:track:abc123def456ghi789jkl0")
            .expand(&gateway)
            .await
            .flatten();

        let track = tracks.get(0).unwrap();
        assert!(track.is_full());
        assert_eq!(track.popularity(), 42);
    }
}
