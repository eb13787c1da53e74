use thiserror::Error;

/// Errors that can occur while streaming visualization data
#[derive(Debug, Error)]
pub enum VizError {
    /// The external rendering client could not be started
    #[error("render client at '{path}' failed to launch: {source}")]
    Launch {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on the bridge pipes
    #[error("bridge I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing violation on the wire (short read/write, oversized frame)
    #[error("protocol framing error: {0}")]
    Framing(String),

    /// A frame payload could not be decoded into a message
    #[error("message decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The underlying columnar source failed while iterating
    #[error("source error: {0}")]
    Source(String),

    /// The bridge is no longer running
    #[error("bridge is not running")]
    BridgeClosed,

    /// Background streaming thread could not be spawned
    #[error("failed to spawn streaming thread: {0}")]
    Spawn(std::io::Error),
}

/// Type alias for Results using VizError
pub type Result<T> = std::result::Result<T, VizError>;
