use crate::entry::{refresh_to_full, Entry, Expand};
use crate::gateway::Gateway;
use crate::lastfm::LastFm;
use crate::model::Track;
use crate::queue::{Nested, Queue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ordering {
    #[default]
    None,
    Popularity,
    LastFm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    #[default]
    None,
    Entry,
    Artist,
    Album,
}

/// The top-level state produced by the parser and consumed by the
/// controller pipeline.
#[derive(Debug)]
pub struct Playlist {
    pub entries: Queue<Entry>,
    pub ordering: Ordering,
    pub grouping: Grouping,
    pub unique: bool,
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Playlist {
    pub fn new() -> Self {
        Self {
            entries: Queue::new(),
            ordering: Ordering::None,
            grouping: Grouping::None,
            unique: true,
        }
    }

    /// Runs expand -> dedup -> order -> group. Never fails: a
    /// single bad entry contributes nothing, but the controller always
    /// produces a (possibly empty) queue of tracks.
    pub async fn dispatch(self, gateway: &Gateway, lastfm: Option<&LastFm>) -> Queue<Track> {
        let expanded: Queue<Nested<Track>> = self
            .entries
            .resolve_all(|entry| async move { Ok(Nested::Queue(entry.expand(gateway).await)) })
            .await;
        let mut tracks = expanded.flatten();

        if self.unique {
            tracks = tracks.dedup();
        }

        tracks = match self.ordering {
            Ordering::None => tracks,
            Ordering::Popularity => {
                let mut refreshed = tracks
                    .resolve_all(|t| async move { Ok(refresh_to_full(t, gateway).await) })
                    .await;
                refreshed.sort_by(|a, b| b.popularity().cmp(&a.popularity()));
                refreshed
            }
            Ordering::LastFm => {
                let mut tracks = tracks;
                if let Some(lastfm) = lastfm {
                    let mut items = tracks.into_vec();
                    for track in items.iter_mut() {
                        lastfm.annotate(track).await;
                    }
                    tracks = Queue::from_vec(items);
                }
                tracks.sort_by(|a, b| b.playcount.cmp(&a.playcount));
                tracks
            }
        };

        match self.grouping {
            Grouping::None => tracks,
            Grouping::Artist => tracks.group_by(|t| t.primary_artist().to_lowercase()),
            Grouping::Entry => tracks.group_by(|t| t.entry_text.to_lowercase()),
            Grouping::Album => {
                let refreshed = tracks
                    .resolve_all(|t| async move { Ok(refresh_to_full(t, gateway).await) })
                    .await;
                refreshed.group_by(|t| t.album_name().to_lowercase())
            }
        }
    }
}
