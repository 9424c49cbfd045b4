pub const PROGRAM_NAME: &str = "sluice";
pub const PROGRAM_LOG_LEVEL: &str = "SLUICE_LOG_LEVEL";

/// Level used when `SLUICE_LOG_LEVEL` is unset or unparsable.
pub const DEFAULT_LOG_LEVEL: log::Level = log::Level::Warn;

/// Thread names for the two pipeline workers. Shown in every log line.
pub const INGESTOR_THREAD: &str = "sluice-ingestor";
pub const FLUSHER_THREAD: &str = "sluice-flusher";
