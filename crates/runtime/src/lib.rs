mod config;
pub mod logging;

pub use config::{
    DEFAULT_LOG_LEVEL, FLUSHER_THREAD, INGESTOR_THREAD, PROGRAM_LOG_LEVEL, PROGRAM_NAME,
};

pub use logging::init;
