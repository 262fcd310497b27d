//! Utility modules for funcgraph

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
