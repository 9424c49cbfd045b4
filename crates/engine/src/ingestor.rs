use std::fmt;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, SendError, Sender};
use crossbeam::select;
use log::{debug, error, info, warn};

use crate::{Batch, Encoder, Record};

/// What caused a batch to be handed to the flusher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// The batch reached `flush_bytes`.
    Size,
    /// The flush timer fired with data pending.
    Timer,
    /// The input closed with data pending.
    Final,
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlushReason::Size => "size",
            FlushReason::Timer => "timer",
            FlushReason::Final => "final",
        })
    }
}

/// Counters reported by the ingestor when it stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Records received from the input.
    pub records: u64,
    /// Records appended to a batch.
    pub encoded: u64,
    /// Records whose encoding produced no bytes.
    pub empty: u64,
    /// Records dropped because encoding failed.
    pub encode_errors: u64,
    pub size_flushes: u64,
    pub timer_flushes: u64,
    pub final_flushes: u64,
    /// Bytes lost because the flusher had already stopped.
    pub dropped_bytes: u64,
}

impl IngestStats {
    pub fn flushes(&self) -> u64 {
        self.size_flushes + self.timer_flushes + self.final_flushes
    }

    fn count(&mut self, reason: FlushReason) {
        match reason {
            FlushReason::Size => self.size_flushes += 1,
            FlushReason::Timer => self.timer_flushes += 1,
            FlushReason::Final => self.final_flushes += 1,
        }
    }
}

/// The ingest loop is over: the input closed or the flusher hung up.
struct Stopped;

/// Reads records, encodes them into the active batch and hands full batches
/// to the flusher.
///
/// Every hand-off blocks until the flusher takes the batch, then blocks again
/// until an empty batch comes back on the recycle channel.
pub(crate) struct Ingestor {
    encoder: Box<dyn Encoder>,
    delimiter: Vec<u8>,
    flush_bytes: usize,
    flush_interval: Duration,
    batches: Sender<Batch>,
    recycled: Receiver<Batch>,
    scratch: Vec<u8>,
    stats: IngestStats,
}

impl Ingestor {
    pub(crate) fn new(
        encoder: Box<dyn Encoder>,
        delimiter: Vec<u8>,
        flush_bytes: usize,
        flush_interval: Duration,
        batches: Sender<Batch>,
        recycled: Receiver<Batch>,
    ) -> Self {
        Self {
            encoder,
            delimiter,
            flush_bytes,
            flush_interval,
            batches,
            recycled,
            scratch: Vec::new(),
            stats: IngestStats::default(),
        }
    }

    /// Run until `input` is closed and drained, or the flusher stops.
    ///
    /// Dropping `self` on return closes the batch channel, which is how the
    /// flusher learns that no more batches are coming.
    pub(crate) fn run(mut self, input: Receiver<Record>, batch: Batch) -> IngestStats {
        let ticker = channel::tick(self.flush_interval);
        let mut batch = batch;

        loop {
            let next = select! {
                recv(input) -> msg => match msg {
                    Ok(record) => self.on_record(record, batch),
                    Err(_) => {
                        self.on_close(batch);
                        Err(Stopped)
                    }
                },
                recv(ticker) -> _ => self.on_tick(batch),
            };

            batch = match next {
                Ok(batch) => batch,
                Err(Stopped) => break,
            };
        }

        info!(
            "ingestor stopped: {} records, {} encode errors, {} flushes",
            self.stats.records,
            self.stats.encode_errors,
            self.stats.flushes()
        );
        self.stats
    }

    fn on_record(&mut self, record: Record, mut batch: Batch) -> Result<Batch, Stopped> {
        self.stats.records += 1;

        self.scratch.clear();
        if let Err(err) = self.encoder.encode(&record, &mut self.scratch) {
            self.stats.encode_errors += 1;
            warn!("Error encoding record with {}: {err}", self.encoder.name());
            return Ok(batch);
        }
        if self.scratch.is_empty() {
            self.stats.empty += 1;
            return Ok(batch);
        }

        batch.append(&self.scratch, &self.delimiter, record.hop_count);
        self.stats.encoded += 1;

        if batch.len() >= self.flush_bytes {
            return self.handoff(batch, FlushReason::Size);
        }
        Ok(batch)
    }

    fn on_tick(&mut self, batch: Batch) -> Result<Batch, Stopped> {
        if batch.is_empty() {
            return Ok(batch);
        }
        self.handoff(batch, FlushReason::Timer)
    }

    fn on_close(&mut self, batch: Batch) {
        if batch.is_empty() {
            debug!("input closed with nothing pending");
            return;
        }
        // The recycled buffer is not waited for: nothing will be appended.
        if self.send(batch, FlushReason::Final).is_ok() {
            self.stats.count(FlushReason::Final);
        }
    }

    fn handoff(&mut self, batch: Batch, reason: FlushReason) -> Result<Batch, Stopped> {
        self.send(batch, reason)?;
        self.stats.count(reason);

        match self.recycled.recv() {
            Ok(batch) => Ok(batch),
            Err(_) => {
                error!("flusher stopped without returning a batch");
                Err(Stopped)
            }
        }
    }

    fn send(&mut self, batch: Batch, reason: FlushReason) -> Result<(), Stopped> {
        debug!(
            "{reason} flush: {} records, {} bytes",
            batch.record_count(),
            batch.len()
        );

        if let Err(SendError(lost)) = self.batches.send(batch) {
            self.stats.dropped_bytes += lost.len() as u64;
            error!(
                "flusher has stopped; dropping {} records ({} bytes)",
                lost.record_count(),
                lost.len()
            );
            return Err(Stopped);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "ingestor_tests.rs"]
mod tests;
