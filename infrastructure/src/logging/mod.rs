//! Logging infrastructure: structured pipeline event logging.
//!
//! Provides [`JsonlEventLogger`], a JSONL file writer that implements the
//! [`EventLogger`](brain_application::EventLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlEventLogger;
