use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_FLUSH_BYTES: usize = 10;
pub const DEFAULT_TAG: &str = "filtered";
pub const DEFAULT_DELIMITER: &str = "\n";
/// Initial capacity of each of the two batch buffers.
pub const DEFAULT_BATCH_CAPACITY: usize = 10_000;
pub const DEFAULT_MAX_HOPS: u32 = 4;

/// How a flushed batch is laid out in the envelope payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Framing {
    /// Delimiter after every record, payload left uncompressed.
    #[default]
    #[serde(rename = "delimited")]
    Delimited,
    /// No delimiter, whole batch zlib-compressed.
    #[serde(rename = "compressed")]
    Compressed,
    #[serde(rename = "delimited+compressed")]
    DelimitedCompressed,
}

impl Framing {
    pub fn delimits(self) -> bool {
        matches!(self, Framing::Delimited | Framing::DelimitedCompressed)
    }

    pub fn compresses(self) -> bool {
        matches!(self, Framing::Compressed | Framing::DelimitedCompressed)
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Framing::Delimited => "delimited",
            Framing::Compressed => "compressed",
            Framing::DelimitedCompressed => "delimited+compressed",
        })
    }
}

impl FromStr for Framing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delimited" => Ok(Framing::Delimited),
            "compressed" => Ok(Framing::Compressed),
            "delimited+compressed" | "compressed+delimited" => Ok(Framing::DelimitedCompressed),
            _ => Err(ConfigError::InvalidFraming(s.to_string())),
        }
    }
}

/// Settings for one batcher run. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatcherConfig {
    /// Period of the flush timer.
    pub flush_interval_ms: u64,
    /// Batch length at which a size flush fires.
    pub flush_bytes: usize,
    /// Tag stamped on every envelope.
    pub tag: String,
    /// Name of the encoder to resolve from the registry.
    pub encoder: String,
    /// Appended after every record when the framing delimits.
    pub delimiter: String,
    pub framing: Framing,
    pub batch_capacity: usize,
    /// Batches whose records carry more hops than this stop the flusher.
    pub max_hops: u32,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            flush_bytes: DEFAULT_FLUSH_BYTES,
            tag: DEFAULT_TAG.to_string(),
            encoder: String::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            framing: Framing::default(),
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

impl BatcherConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag.is_empty() {
            return Err(ConfigError::EmptyTag);
        }
        if self.encoder.is_empty() {
            return Err(ConfigError::EmptyEncoder);
        }
        if self.flush_bytes == 0 {
            return Err(ConfigError::ZeroFlushBytes);
        }
        if self.flush_interval_ms == 0 {
            return Err(ConfigError::ZeroFlushInterval);
        }
        Ok(())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Bytes the ingestor writes after each record: the configured
    /// delimiter, or nothing when the framing does not delimit.
    pub fn record_delimiter(&self) -> &[u8] {
        if self.framing.delimits() {
            self.delimiter.as_bytes()
        } else {
            &[]
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
