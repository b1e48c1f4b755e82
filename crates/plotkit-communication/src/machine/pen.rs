//! Stroke to pen-move translation

use super::{MotionSink, PenPosition};
use async_trait::async_trait;
use plotkit_core::{Actuator, ActuatorError, Edge, Point2};

/// Motion parameters for the pen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenSettings {
    /// Standoff distance above the surface for approach and lift moves
    pub draw_offset: f64,
    /// Travel speed in mm/s
    pub speed: f64,
    /// Acceleration in mm/s²
    pub acceleration: f64,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self {
            draw_offset: 30.0,
            speed: 300.0,
            acceleration: 5000.0,
        }
    }
}

/// [`Actuator`] that draws by moving a pen through a [`MotionSink`]
pub struct PenActuator<M> {
    motion: M,
    settings: PenSettings,
}

impl<M: MotionSink> PenActuator<M> {
    /// Configure the sink and return a ready actuator
    pub async fn connect(mut motion: M, settings: PenSettings) -> Result<Self, ActuatorError> {
        motion
            .configure(settings.speed, settings.acceleration)
            .await?;
        Ok(Self { motion, settings })
    }

    pub fn settings(&self) -> &PenSettings {
        &self.settings
    }

    pub fn motion(&self) -> &M {
        &self.motion
    }

    async fn hover(&mut self, at: Point2) -> Result<(), ActuatorError> {
        self.motion
            .move_pen_to(PenPosition::new(at.x, at.y, -self.settings.draw_offset))
            .await
    }

    async fn touch(&mut self, at: Point2) -> Result<(), ActuatorError> {
        self.motion
            .move_pen_to(PenPosition::new(at.x, at.y, 0.0))
            .await
    }
}

#[async_trait]
impl<M: MotionSink> Actuator for PenActuator<M> {
    async fn draw_point(&mut self, at: Point2) -> Result<(), ActuatorError> {
        tracing::info!("Point at {}", at);
        self.hover(at).await?;
        self.touch(at).await?;
        self.hover(at).await
    }

    async fn draw_line(&mut self, from: Point2, to: Point2) -> Result<(), ActuatorError> {
        tracing::info!("Line from {} to {}", from, to);
        self.hover(from).await?;
        self.touch(from).await?;
        self.touch(to).await?;
        self.hover(to).await
    }

    async fn draw_path(&mut self, edges: &[Edge]) -> Result<(), ActuatorError> {
        let (Some(first), Some(last)) = (edges.first(), edges.last()) else {
            return Err(ActuatorError::EmptyPath);
        };
        tracing::info!("Poly line of {} lines", edges.len());

        self.hover(first.from).await?;
        self.touch(first.from).await?;
        for edge in edges {
            self.touch(edge.to).await?;
        }
        self.hover(last.to).await
    }
}
