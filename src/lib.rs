pub mod config;
pub mod constant;
pub mod entry;
pub mod error;
pub mod gateway;
pub mod lastfm;
pub mod model;
pub mod parser;
pub mod playlist;
pub mod queue;
pub mod render;

pub mod require {
    pub use crate::config::{get_config, set_config, Configs};
    pub use crate::gateway::Gateway;
    pub use crate::lastfm::LastFm;
    pub use crate::playlist::Playlist;
}

pub mod prelude {
    pub use super::require::*;
    pub use crate::entry::{Entry, Expand};
    pub use crate::model::Track;
    pub use crate::queue::Queue;
}

/// Runs parse -> expand -> dedup/order/group -> render end to end. A thin
/// orchestration helper wiring construction and dispatch together for
/// callers that don't need the individual stages.
pub async fn run_program(
    program: &str,
    gateway: &gateway::Gateway,
    lastfm: Option<&lastfm::LastFm>,
) -> String {
    let playlist = parser::parse(program);
    let tracks = playlist.dispatch(gateway, lastfm).await;
    render::render(&tracks)
}

/// A tiny canned HTTP server standing in for the streaming API, so
/// end-to-end tests can run without real network access. Matches
/// requests to a canned response by checking whether the request line
/// contains one of the given path prefixes, in order.
#[cfg(test)]
pub(crate) mod testutil {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    pub async fn spawn_mock_server(
        expected_requests: usize,
        responses: Vec<(&'static str, String)>,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for _ in 0..expected_requests {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request_line = String::from_utf8_lossy(&buf[..n]);
                let path = request_line.lines().next().unwrap_or("").to_string();

                let body = responses
                    .iter()
                    .find(|(prefix, _)| path.contains(prefix))
                    .map(|(_, body)| body.clone())
                    .unwrap_or_else(|| "{}".to_string());

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{addr}/")
    }
}
