mod batch;
mod batcher;
mod config;
mod encoder;
mod error;
mod flusher;
mod ingestor;
mod record;
mod sink;

pub use batch::Batch;
pub use batcher::{Batcher, BatcherReport, RECYCLE_DEPTH};
pub use config::{BatcherConfig, Framing};
pub use encoder::{
    BincodeEncoder, Encoder, EncoderFactory, EncoderRegistry, JsonEncoder, PayloadEncoder,
};
pub use error::{BatcherError, ConfigError, EncodeError, FlushError};
pub use flusher::FlushStats;
pub use ingestor::{FlushReason, IngestStats};
pub use record::Record;
pub use sink::{ChannelSink, HopGuard, Sink, WriterSink};

pub use sluice_protocol::{Envelope, PayloadEncoding};
