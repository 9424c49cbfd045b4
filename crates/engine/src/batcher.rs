use std::thread;

use crossbeam::channel::{self, Receiver};
use log::info;
use sluice_runtime::{FLUSHER_THREAD, INGESTOR_THREAD};

use crate::flusher::Flusher;
use crate::ingestor::Ingestor;
use crate::{
    Batch, BatcherConfig, BatcherError, ConfigError, Encoder, EncoderRegistry, FlushStats,
    HopGuard, IngestStats, Record, Sink,
};

/// Depth of the channel carrying emptied batches back to the ingestor.
pub const RECYCLE_DEPTH: usize = 2;

/// What both workers reported once they stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatcherReport {
    pub ingest: IngestStats,
    pub flush: FlushStats,
}

impl BatcherReport {
    /// The hop guard stopped the flusher before the input was drained.
    pub fn halted(&self) -> bool {
        self.flush.halted
    }
}

/// A validated configuration with its encoder resolved, ready to run.
///
/// All configuration problems surface from [`Batcher::new`]; once it
/// returns, [`Batcher::run`] only fails if a worker cannot be started or
/// panics.
pub struct Batcher {
    config: BatcherConfig,
    encoder: Box<dyn Encoder>,
}

impl std::fmt::Debug for Batcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batcher")
            .field("config", &self.config)
            .field("encoder", &self.encoder.name())
            .finish()
    }
}

impl Batcher {
    pub fn new(config: BatcherConfig, registry: &EncoderRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        let encoder = registry.resolve(&config.encoder)?;
        Ok(Self { config, encoder })
    }

    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    /// Batch everything from `input` into `sink`, returning once the input
    /// has been closed and drained (or the hop guard stopped the flusher) and
    /// both workers have exited.
    pub fn run<S>(self, input: Receiver<Record>, sink: S) -> Result<BatcherReport, BatcherError>
    where
        S: Sink + 'static,
    {
        let Batcher { config, encoder } = self;

        info!(
            "starting batcher: tag={}, encoder={}, flush_bytes={}, flush_interval={:?}, framing={}",
            config.tag,
            encoder.name(),
            config.flush_bytes,
            config.flush_interval(),
            config.framing
        );

        // Zero capacity: a hand-off completes only when the flusher takes it.
        let (batch_tx, batch_rx) = channel::bounded::<Batch>(0);
        let (recycle_tx, recycle_rx) = channel::bounded::<Batch>(RECYCLE_DEPTH);

        // Two buffers in total: one seeded here for the ingestor's first
        // hand-off, one it starts filling.
        let _ = recycle_tx.send(Batch::with_capacity(config.batch_capacity));
        let initial = Batch::with_capacity(config.batch_capacity);

        let flusher = Flusher::new(
            config.tag.clone(),
            config.framing,
            HopGuard::new(config.max_hops),
            sink,
            batch_rx,
            recycle_tx,
        );
        let flusher_handle = thread::Builder::new()
            .name(FLUSHER_THREAD.to_string())
            .spawn(move || flusher.run())
            .map_err(|source| BatcherError::Spawn {
                worker: "flusher",
                source,
            })?;

        let ingestor = Ingestor::new(
            encoder,
            config.record_delimiter().to_vec(),
            config.flush_bytes,
            config.flush_interval(),
            batch_tx,
            recycle_rx,
        );
        let ingestor_handle = thread::Builder::new()
            .name(INGESTOR_THREAD.to_string())
            .spawn(move || ingestor.run(input, initial))
            .map_err(|source| BatcherError::Spawn {
                worker: "ingestor",
                source,
            })?;

        let ingest = ingestor_handle
            .join()
            .map_err(|_| BatcherError::WorkerPanicked("ingestor"))?;
        let flush = flusher_handle
            .join()
            .map_err(|_| BatcherError::WorkerPanicked("flusher"))?;

        info!(
            "batcher finished: {} records in, {} envelopes out{}",
            ingest.records,
            flush.envelopes,
            if flush.halted { " (halted by hop guard)" } else { "" }
        );

        Ok(BatcherReport { ingest, flush })
    }
}

#[cfg(test)]
#[path = "batcher_tests.rs"]
mod tests;
