use std::io;

/// Failures surfaced by the server outside the simulation itself.
///
/// Only configuration and bind errors are fatal. Everything else ends the
/// single connection it happened on.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("simulation loop is no longer running")]
    ChannelClosed,
}
