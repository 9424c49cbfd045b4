pub mod codec;
mod payload;

use std::fmt;
use std::io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use payload::{compress_zlib, decompress_zlib};

/// How the bytes in [`Envelope::payload`] are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadEncoding {
    /// The batch bytes as accumulated.
    Raw,
    /// The batch bytes run through a zlib stream.
    Zlib,
}

impl fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadEncoding::Raw => f.write_str("raw"),
            PayloadEncoding::Zlib => f.write_str("zlib"),
        }
    }
}

/// One flushed batch, as handed to a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Fresh random id, unique per envelope.
    pub id: Uuid,
    pub tag: String,
    /// Time the envelope was built.
    pub timestamp: DateTime<Utc>,
    /// Highest hop count among the records in the batch.
    pub hop_count: u32,
    pub encoding: PayloadEncoding,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn new(
        tag: impl Into<String>,
        hop_count: u32,
        encoding: PayloadEncoding,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag: tag.into(),
            timestamp: Utc::now(),
            hop_count,
            encoding,
            payload,
        }
    }

    /// Payload bytes with any compression undone.
    pub fn decoded_payload(&self) -> io::Result<Vec<u8>> {
        match self.encoding {
            PayloadEncoding::Raw => Ok(self.payload.clone()),
            PayloadEncoding::Zlib => decompress_zlib(&self.payload),
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
