use std::io::Write;

use crossbeam::channel::Sender;
use log::{debug, error};
use sluice_protocol::{Envelope, codec::write_message};

use crate::FlushError;

/// Downstream consumer of envelopes. Delivery is best effort: a sink that
/// cannot deliver logs the problem and returns.
pub trait Sink: Send {
    fn inject(&mut self, envelope: Envelope);
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn inject(&mut self, envelope: Envelope) {
        (**self).inject(envelope)
    }
}

/// Forwards envelopes into a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<Envelope>,
}

impl ChannelSink {
    pub fn new(tx: Sender<Envelope>) -> Self {
        Self { tx }
    }
}

impl Sink for ChannelSink {
    fn inject(&mut self, envelope: Envelope) {
        if let Err(err) = self.tx.send(envelope) {
            debug!("envelope {} dropped: receiver is gone", err.0.id);
        }
    }
}

/// Writes each envelope as a length-prefixed frame (see
/// [`sluice_protocol::codec`]).
pub struct WriterSink<W: Write + Send> {
    writer: W,
    written: u64,
    failed: u64,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            failed: 0,
        }
    }

    /// Envelopes successfully written.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Envelopes that could not be written.
    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn inject(&mut self, envelope: Envelope) {
        match write_message(&mut self.writer, &envelope) {
            Ok(()) => self.written += 1,
            Err(err) => {
                self.failed += 1;
                error!("Failed to write envelope {}: {err:#}", envelope.id);
            }
        }
    }
}

/// Refuses batches whose records have been fed back through the pipeline
/// more than `max_hops` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopGuard {
    max_hops: u32,
}

impl HopGuard {
    pub fn new(max_hops: u32) -> Self {
        Self { max_hops }
    }

    pub fn max_hops(&self) -> u32 {
        self.max_hops
    }

    pub fn admit(&self, hop_count: u32) -> Result<(), FlushError> {
        if hop_count > self.max_hops {
            return Err(FlushError::HopLimitExceeded {
                hops: hop_count,
                max: self.max_hops,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
