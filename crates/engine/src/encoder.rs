use bincode::config;
use hashbrown::HashMap;
use serde::Serialize;

use crate::{ConfigError, EncodeError, Record};

/// Turns one [`Record`] into bytes.
///
/// `out` arrives empty and is reused across records, so implementations
/// should append to it rather than replace it.
pub trait Encoder: Send {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn encode(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), EncodeError>;
}

pub type EncoderFactory = Box<dyn Fn() -> Box<dyn Encoder> + Send + Sync>;

/// Name to factory map, owned by whoever starts the batcher.
///
/// `EncoderRegistry::new()` is empty; `Default` and
/// [`EncoderRegistry::with_builtin_encoders`] come with `payload`, `json`
/// and `bincode` registered.
pub struct EncoderRegistry {
    factories: HashMap<String, EncoderFactory>,
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::with_builtin_encoders()
    }
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn with_builtin_encoders() -> Self {
        let mut registry = Self::new();
        registry.register_builtin_encoders();
        registry
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: EncoderFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build a fresh encoder instance for `name`.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn Encoder>, ConfigError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEncoder(name.to_string()))?;
        Ok(factory())
    }

    fn register_builtin_encoders(&mut self) {
        self.register(
            PayloadEncoder::NAME,
            Box::new(|| Box::new(PayloadEncoder) as Box<dyn Encoder>),
        );
        self.register(
            JsonEncoder::NAME,
            Box::new(|| Box::new(JsonEncoder) as Box<dyn Encoder>),
        );
        self.register(
            BincodeEncoder::NAME,
            Box::new(|| Box::new(BincodeEncoder) as Box<dyn Encoder>),
        );
    }
}

/// Emits the record payload unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PayloadEncoder;

impl PayloadEncoder {
    pub const NAME: &'static str = "payload";
}

impl Encoder for PayloadEncoder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn encode(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.extend_from_slice(&record.payload);
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    hop_count: u32,
    payload: &'a str,
}

/// Emits `{"hop_count":N,"payload":"..."}`. Payloads must be UTF-8.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEncoder;

impl JsonEncoder {
    pub const NAME: &'static str = "json";
}

impl Encoder for JsonEncoder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn encode(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        let doc = JsonRecord {
            hop_count: record.hop_count,
            payload: record.payload_str()?,
        };
        serde_json::to_writer(out, &doc)?;
        Ok(())
    }
}

/// Emits the whole record in bincode's standard configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeEncoder;

impl BincodeEncoder {
    pub const NAME: &'static str = "bincode";
}

impl Encoder for BincodeEncoder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn encode(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        bincode::serde::encode_into_std_write(record, out, config::standard())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "encoder_tests.rs"]
mod tests;
