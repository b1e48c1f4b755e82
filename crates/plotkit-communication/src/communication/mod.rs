//! Client-facing communication
//!
//! Line framing for the plotting protocol and the TCP ingestion listener.

pub mod line_buffer;
pub mod listener;

pub use line_buffer::{LineBuffer, DEFAULT_MAX_LINE_LENGTH};
pub use listener::{serve_connection, ConnectionStats, IngestionListener, ListenerConfig};
