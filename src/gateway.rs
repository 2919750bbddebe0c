use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use reqwest::Url;
use serde_json::Value;

use crate::error::GatewayError;

/// The throttled remote-lookup engine. Encapsulates the "earliest
/// next request" pacing clock as owned state passed by reference to every
/// expander, rather than a process-wide singleton (DESIGN NOTES).
#[derive(Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: Url,
    min_delay: Duration,
    next_allowed: Arc<Mutex<Instant>>,
}

impl Gateway {
    pub fn new(base_url: impl AsRef<str>, min_delay: Duration) -> anyhow::Result<Self> {
        let base_url = base_url.as_ref();
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(&base_url)?,
            min_delay,
            next_allowed: Arc::new(Mutex::new(Instant::now())),
        })
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Sleeps, if needed, so that at least `min_delay` has elapsed since the
    /// previous request's dispatch. This is process-wide pacing state,
    /// mutated only by the gateway).
    async fn pace(&self) {
        let wait = {
            let mut next_allowed = self.next_allowed.lock();
            let now = Instant::now();
            let wait = next_allowed.saturating_duration_since(now);
            *next_allowed = now.max(*next_allowed) + self.min_delay;
            wait
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// Issues `GET <base_url><path>?<query>`, enforcing pacing, and maps
    /// transport/HTTP/parse/API-envelope failures. `base_url` is normalized
    /// to end in `/` in `new`, since `Url::join` resolves a relative path
    /// against the base's directory and would otherwise drop its last
    /// segment (e.g. the `v1` in `.../v1/tracks/123`).
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, GatewayError> {
        self.pace().await;

        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        tracing::debug!(%url, ?query, "gateway request");

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(GatewayError::Http {
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let body: Value =
            serde_json::from_str(&text).map_err(|e| GatewayError::Parse(e.to_string()))?;

        if body.get("error").is_some() {
            return Err(GatewayError::Api { body });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pacing_enforces_minimum_delay_between_requests() {
        let gw = Gateway::new("http://127.0.0.1:0/", Duration::from_millis(50)).unwrap();
        let start = Instant::now();
        gw.pace().await;
        gw.pace().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn base_url_without_trailing_slash_still_keeps_its_last_segment() {
        let gw = Gateway::new("https://api.spotify.com/v1", Duration::from_millis(0)).unwrap();
        let url = gw.base_url.join("tracks/123").unwrap();
        assert_eq!(url.as_str(), "https://api.spotify.com/v1/tracks/123");
    }
}
