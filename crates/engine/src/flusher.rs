use crossbeam::channel::{Receiver, Sender};
use log::{debug, error, info};
use sluice_protocol::{Envelope, PayloadEncoding, compress_zlib};

use crate::{Batch, FlushError, Framing, HopGuard, Sink};

/// Counters reported by the flusher when it stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Envelopes handed to the sink.
    pub envelopes: u64,
    /// Batch bytes received from the ingestor.
    pub input_bytes: u64,
    /// Payload bytes handed to the sink, after compression.
    pub payload_bytes: u64,
    /// Batches whose contents were discarded because they could not be
    /// turned into an envelope.
    pub dropped_batches: u64,
    /// Set when the hop guard stopped the flusher.
    pub halted: bool,
}

/// Turns batches into envelopes, submits them, and returns the emptied
/// buffers to the ingestor.
pub(crate) struct Flusher<S: Sink> {
    tag: String,
    framing: Framing,
    guard: HopGuard,
    sink: S,
    batches: Receiver<Batch>,
    recycled: Sender<Batch>,
}

impl<S: Sink> Flusher<S> {
    pub(crate) fn new(
        tag: String,
        framing: Framing,
        guard: HopGuard,
        sink: S,
        batches: Receiver<Batch>,
        recycled: Sender<Batch>,
    ) -> Self {
        Self {
            tag,
            framing,
            guard,
            sink,
            batches,
            recycled,
        }
    }

    /// Run until the batch channel is closed and drained, or the hop guard
    /// refuses a batch.
    pub(crate) fn run(mut self) -> FlushStats {
        let mut stats = FlushStats::default();

        while let Ok(mut batch) = self.batches.recv() {
            stats.input_bytes += batch.len() as u64;

            match self.seal(&batch) {
                Ok(envelope) => {
                    debug!(
                        "submitting envelope {}: {} records, {} payload bytes",
                        envelope.id,
                        batch.record_count(),
                        envelope.payload.len()
                    );
                    stats.envelopes += 1;
                    stats.payload_bytes += envelope.payload.len() as u64;
                    self.sink.inject(envelope);
                }
                Err(err @ FlushError::HopLimitExceeded { .. }) => {
                    error!("{err}; stopping flusher");
                    stats.halted = true;
                    break;
                }
                Err(err) => {
                    error!("dropping batch of {} bytes: {err}", batch.len());
                    stats.dropped_batches += 1;
                }
            }

            batch.reset();
            if self.recycled.send(batch).is_err() {
                debug!("ingestor is gone; discarding recycled batch");
            }
        }

        info!(
            "flusher stopped: {} envelopes, {} bytes in, {} bytes out",
            stats.envelopes, stats.input_bytes, stats.payload_bytes
        );
        stats
    }

    fn seal(&self, batch: &Batch) -> Result<Envelope, FlushError> {
        self.guard.admit(batch.hop_count())?;

        let (encoding, payload) = if self.framing.compresses() {
            let out = Vec::with_capacity(batch.len() / 2 + 16);
            (PayloadEncoding::Zlib, compress_zlib(batch.as_bytes(), out)?)
        } else {
            (PayloadEncoding::Raw, batch.as_bytes().to_vec())
        };

        Ok(Envelope::new(
            self.tag.clone(),
            batch.hop_count(),
            encoding,
            payload,
        ))
    }
}

#[cfg(test)]
#[path = "flusher_tests.rs"]
mod tests;
