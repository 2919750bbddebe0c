pub const STREAMING_API_ENDPOINT: &str = "https://api.spotify.com/v1/";
pub const LASTFM_API_ENDPOINT: &str = "https://ws.audioscrobbler.com/2.0/";

pub const DEFAULT_CONFIG_FOLDER: &str = ".config/playlist-gen";
pub const APP_CONFIG_FILE: &str = "app.toml";

/// Minimum delay enforced between two gateway requests.
pub const MIN_REQUEST_DELAY_MS: u64 = 100;
