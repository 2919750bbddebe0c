use once_cell::sync::Lazy;
use regex::Regex;

use crate::entry::{AlbumEntry, ArtistEntry, Entry};
use crate::model::Track;
use crate::playlist::{Grouping, Ordering, Playlist};

static LASTFM_ORDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^#\s*(SORT|ORDER)\s+BY\s+LAST\.?FM\s*$").unwrap());

/// Reads a text program into a `Playlist`. Does no I/O: the result
/// is a plain `Queue<Entry>` plus whatever directives were set.
pub fn parse(program: &str) -> Playlist {
    let mut playlist = Playlist::new();

    for raw_line in program.split(['\r', '\n']) {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        apply_line(line, &mut playlist);
    }

    playlist
}

fn apply_line(line: &str, playlist: &mut Playlist) {
    let upper = line.to_uppercase();

    if upper.starts_with("##") {
        return; // comment
    }
    if upper == "#ORDER BY POPULARITY" {
        playlist.ordering = Ordering::Popularity;
        return;
    }
    if LASTFM_ORDER_RE.is_match(line) {
        playlist.ordering = Ordering::LastFm;
        return;
    }
    if upper == "#GROUP BY ENTRY" {
        playlist.grouping = Grouping::Entry;
        return;
    }
    if upper == "#GROUP BY ARTIST" {
        playlist.grouping = Grouping::Artist;
        return;
    }
    if upper == "#GROUP BY ALBUM" {
        playlist.grouping = Grouping::Album;
        return;
    }
    if upper == "#UNIQUE" {
        playlist.unique = true;
        return;
    }
    if let Some(rest) = strip_prefix_ci(line, "#ALBUM ") {
        playlist.entries.add(Entry::Album(AlbumEntry::new(rest.trim())));
        return;
    }
    if let Some(rest) = strip_prefix_ci(line, "#ARTIST ") {
        playlist
            .entries
            .add(Entry::Artist(ArtistEntry::new(rest.trim())));
        return;
    }
    if upper.starts_with('#') {
        // Unknown directive: silently ignored, treated as a comment.
        return;
    }

    playlist.entries.add(Entry::Track(Track::unresolved(line)));
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    if line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}
