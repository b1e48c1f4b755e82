//! Actuator interface
//!
//! The contract the dispatcher drives. Implementations own everything physical:
//! standoff offset, approach and lift moves, speed and acceleration.

use crate::command::{Edge, Point2};
use crate::error::ActuatorError;
use async_trait::async_trait;

/// A pen manipulator able to draw strokes on the surface
///
/// Every call either completes the whole stroke or fails. A failure leaves the pen
/// in an unknown state, so callers must not issue further strokes after one.
#[async_trait]
pub trait Actuator: Send {
    /// Dab the surface at `at`
    async fn draw_point(&mut self, at: Point2) -> Result<(), ActuatorError>;

    /// Draw a straight stroke from `from` to `to`
    async fn draw_line(&mut self, from: Point2, to: Point2) -> Result<(), ActuatorError>;

    /// Draw `edges` as one continuous stroke
    ///
    /// The pen approaches above the first edge's start, touches down, visits each
    /// edge's end point in order while in contact, then lifts above the last end point.
    async fn draw_path(&mut self, edges: &[Edge]) -> Result<(), ActuatorError>;
}

#[async_trait]
impl<A: Actuator + ?Sized> Actuator for Box<A> {
    async fn draw_point(&mut self, at: Point2) -> Result<(), ActuatorError> {
        (**self).draw_point(at).await
    }

    async fn draw_line(&mut self, from: Point2, to: Point2) -> Result<(), ActuatorError> {
        (**self).draw_line(from, to).await
    }

    async fn draw_path(&mut self, edges: &[Edge]) -> Result<(), ActuatorError> {
        (**self).draw_path(edges).await
    }
}
