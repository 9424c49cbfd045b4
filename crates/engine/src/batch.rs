/// Reusable byte buffer moved back and forth between the ingestor and the
/// flusher.
///
/// Only one worker owns a given `Batch` at a time; it changes hands by being
/// sent over a channel. [`Batch::reset`] empties it without giving up its
/// allocation, so the same two buffers are reused for the whole run.
#[derive(Debug)]
pub struct Batch {
    buf: Vec<u8>,
    records: usize,
    hop_count: u32,
}

impl Batch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            records: 0,
            hop_count: 0,
        }
    }

    /// Append one encoded record followed by `delimiter` (which may be empty).
    pub fn append(&mut self, fragment: &[u8], delimiter: &[u8], hop_count: u32) {
        self.buf.reserve(fragment.len() + delimiter.len());
        self.buf.extend_from_slice(fragment);
        self.buf.extend_from_slice(delimiter);
        self.records += 1;
        self.hop_count = self.hop_count.max(hop_count);
    }

    /// Empty the batch. Capacity is kept.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.records = 0;
        self.hop_count = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of records appended since the last reset.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Highest hop count among the records appended since the last reset.
    pub fn hop_count(&self) -> u32 {
        self.hop_count
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
