//! Pen manipulator drivers
//!
//! [`PenActuator`] turns strokes into pen moves in the surface frame: approach at
//! the standoff height, touch the surface, travel, lift. Where those moves go is up
//! to the [`MotionSink`]:
//! - [`SimulatedMotion`]: tracks and logs the pen without hardware
//! - [`GcodeMotion`]: streams G-code to stdout, a file or a networked controller

pub mod gcode;
pub mod pen;
pub mod simulated;

pub use gcode::GcodeMotion;
pub use pen::{PenActuator, PenSettings};
pub use simulated::SimulatedMotion;

use async_trait::async_trait;
use plotkit_core::ActuatorError;
use std::fmt;

/// Pen tip position in the surface frame
///
/// `z` points into the surface: `0` is contact and the standoff height is `-offset`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PenPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PenPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for PenPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Destination for linear pen moves
#[async_trait]
pub trait MotionSink: Send {
    /// Apply speed (mm/s) and acceleration (mm/s²) before the first move
    async fn configure(&mut self, _speed: f64, _acceleration: f64) -> Result<(), ActuatorError> {
        Ok(())
    }

    /// Move the pen tip in a straight line to `target`
    async fn move_pen_to(&mut self, target: PenPosition) -> Result<(), ActuatorError>;
}
