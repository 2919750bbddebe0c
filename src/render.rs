use crate::model::Track;
use crate::queue::Queue;

/// Produces the final newline-separated identifier list. Pure and
/// synchronous: no I/O, no trailing newline, tracks with an empty URI are
/// skipped.
pub fn render(tracks: &Queue<Track>) -> String {
    tracks
        .iter()
        .map(Track::uri)
        .filter(|uri| !uri.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackMeta;

    #[test]
    fn skips_empty_uris_and_joins_with_newline() {
        let meta_a = TrackMeta {
            uri: "spotify:track:aaaaaaaaaaaaaaaaaaaaaa".to_string(),
            ..Default::default()
        };
        let meta_b = TrackMeta {
            uri: "spotify:track:bbbbbbbbbbbbbbbbbbbbbb".to_string(),
            ..Default::default()
        };

        let tracks = Queue::from_vec(vec![
            Track::simple("a", meta_a),
            Track::unresolved("unresolved"),
            Track::simple("b", meta_b),
        ]);

        assert_eq!(
            render(&tracks),
            "spotify:track:aaaaaaaaaaaaaaaaaaaaaa\nspotify:track:bbbbbbbbbbbbbbbbbbbbbb"
        );
    }
}
