//! Dispatch loop
//!
//! Consumes the command queue in order and turns commands into actuator strokes,
//! joining consecutive polyline segments into a single path.

pub mod coalescer;
pub mod dispatcher;

pub use coalescer::{Coalescer, Stroke};
pub use dispatcher::{DispatchSummary, Dispatcher};
