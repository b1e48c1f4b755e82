//! # Plotkit Core
//!
//! Core types and the drawing pipeline for Plotkit:
//! - the wire command model and its validation
//! - the command queue shared by ingestion and dispatch
//! - the actuator contract
//! - the dispatcher and its polyline coalescer

pub mod actuator;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod queue;

pub use actuator::Actuator;
pub use command::{parse_line, Command, Edge, Point2};
pub use dispatch::{Coalescer, DispatchSummary, Dispatcher, Stroke};
pub use error::{ActuatorError, CommandError, ConnectionError, DispatchError};
pub use queue::{CommandQueue, QueueClosed};
