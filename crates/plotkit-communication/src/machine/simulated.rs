//! Hardware-free motion sink

use super::{MotionSink, PenPosition};
use async_trait::async_trait;
use plotkit_core::ActuatorError;
use std::time::Duration;

/// Tracks the pen position and logs every move
///
/// An optional per-move delay stands in for the time a real manipulator takes.
#[derive(Debug, Default)]
pub struct SimulatedMotion {
    position: Option<PenPosition>,
    move_count: u64,
    move_delay: Duration,
}

impl SimulatedMotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` after each move
    pub fn with_move_delay(mut self, delay: Duration) -> Self {
        self.move_delay = delay;
        self
    }

    /// Last commanded position, `None` before the first move
    pub fn position(&self) -> Option<PenPosition> {
        self.position
    }

    pub fn move_count(&self) -> u64 {
        self.move_count
    }
}

#[async_trait]
impl MotionSink for SimulatedMotion {
    async fn configure(&mut self, speed: f64, acceleration: f64) -> Result<(), ActuatorError> {
        tracing::info!(speed, acceleration, "Simulated pen ready");
        Ok(())
    }

    async fn move_pen_to(&mut self, target: PenPosition) -> Result<(), ActuatorError> {
        tracing::debug!("Pen to {}", target);
        if !self.move_delay.is_zero() {
            tokio::time::sleep(self.move_delay).await;
        }
        self.position = Some(target);
        self.move_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tracks_position() {
        let mut motion = SimulatedMotion::new();
        assert_eq!(motion.position(), None);

        motion
            .move_pen_to(PenPosition::new(1.0, 2.0, -30.0))
            .await
            .unwrap();
        motion
            .move_pen_to(PenPosition::new(1.0, 2.0, 0.0))
            .await
            .unwrap();

        assert_eq!(motion.position(), Some(PenPosition::new(1.0, 2.0, 0.0)));
        assert_eq!(motion.move_count(), 2);
    }
}
