use serde::{Deserialize, Serialize};

/// One unit of input.
///
/// `hop_count` counts how many times this record has already been fed back
/// through a pipeline; batches carrying too many hops are refused at flush
/// time so a loop cannot amplify itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub payload: Vec<u8>,
    pub hop_count: u32,
}

impl Record {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            hop_count: 0,
        }
    }

    pub fn with_hop_count(mut self, hop_count: u32) -> Self {
        self.hop_count = hop_count;
        self
    }

    pub fn payload_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.payload)
    }
}
