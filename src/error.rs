use std::fmt;

/// Failures produced by the HTTP gateway.
///
/// Callers above the gateway never match on this directly except to decide
/// whether a failure is the "soft" not-found case; everywhere else it is
/// folded into `anyhow::Error` via `?`.
#[derive(Debug)]
pub enum GatewayError {
    Transport(String),
    Http { status: u16 },
    Parse(String),
    Api { body: serde_json::Value },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(msg) => write!(f, "transport error: {msg}"),
            GatewayError::Http { status } => write!(f, "http error: status {status}"),
            GatewayError::Parse(msg) => write!(f, "parse error: {msg}"),
            GatewayError::Api { body } => write!(f, "api error: {body}"),
        }
    }
}

impl std::error::Error for GatewayError {}
