use std::io;

/// Problems detected before any worker starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("a tag value must be specified")]
    EmptyTag,

    #[error("an encoder must be specified")]
    EmptyEncoder,

    #[error("flush_bytes must be greater than zero")]
    ZeroFlushBytes,

    #[error("flush_interval_ms must be greater than zero")]
    ZeroFlushInterval,

    #[error("encoder not found: {0}")]
    UnknownEncoder(String),

    #[error("invalid framing `{0}` (expected delimited, compressed or delimited+compressed)")]
    InvalidFraming(String),
}

/// Failure to encode a single record. The record is dropped.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode serialization error: {0}")]
    Bincode(#[from] bincode::error::EncodeError),

    #[error("{0}")]
    Other(String),
}

/// Failure while turning a batch into an envelope.
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    /// The hop guard refused the batch. Fatal for the flusher.
    #[error("exceeded max hop count: batch at {hops} hops, limit is {max}")]
    HopLimitExceeded { hops: u32, max: u32 },

    #[error("failed to compress batch: {0}")]
    Compression(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum BatcherError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn {worker} thread: {source}")]
    Spawn {
        worker: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}
