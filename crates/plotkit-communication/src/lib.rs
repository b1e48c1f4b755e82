//! # Plotkit Communication
//!
//! Everything that talks to the outside world:
//! - the TCP ingestion listener and protocol line framing
//! - pen manipulator drivers implementing the core `Actuator` contract

pub mod communication;
pub mod machine;

pub use communication::{
    serve_connection, ConnectionStats, IngestionListener, LineBuffer, ListenerConfig,
    DEFAULT_MAX_LINE_LENGTH,
};
pub use machine::{GcodeMotion, MotionSink, PenActuator, PenPosition, PenSettings, SimulatedMotion};
