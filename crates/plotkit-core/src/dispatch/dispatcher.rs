//! Dispatcher task
//!
//! The single consumer of the [`CommandQueue`]. Pulls commands in order, feeds them
//! through the [`Coalescer`] and executes the resulting strokes on the actuator.

use super::coalescer::{Coalescer, Stroke};
use crate::actuator::Actuator;
use crate::command::Command;
use crate::error::{ActuatorError, DispatchError};
use crate::queue::CommandQueue;
use std::sync::Arc;

/// Counters for a finished dispatch session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Commands taken from the queue
    pub commands: usize,
    pub points: usize,
    pub lines: usize,
    pub paths: usize,
    /// Total edges across all paths
    pub edges: usize,
}

impl DispatchSummary {
    fn record(&mut self, stroke: &Stroke) {
        match stroke {
            Stroke::Point(_) => self.points += 1,
            Stroke::Line(..) => self.lines += 1,
            Stroke::Path(edges) => {
                self.paths += 1;
                self.edges += edges.len();
            }
        }
    }
}

/// Drives an [`Actuator`] from the command queue
pub struct Dispatcher<A> {
    queue: Arc<CommandQueue>,
    actuator: A,
    coalescer: Coalescer,
    summary: DispatchSummary,
}

impl<A: Actuator> Dispatcher<A> {
    pub fn new(queue: Arc<CommandQueue>, actuator: A) -> Self {
        Self {
            queue,
            actuator,
            coalescer: Coalescer::new(),
            summary: DispatchSummary::default(),
        }
    }

    /// Run until the queue is closed and drained, or until a fatal error
    ///
    /// A pending path is flushed when the queue closes. On a fatal error the queue
    /// is closed so the producer stops accepting commands that would never be drawn.
    pub async fn run(&mut self) -> Result<DispatchSummary, DispatchError> {
        tracing::info!("Dispatcher started");

        match self.drain().await {
            Ok(()) => {
                tracing::info!(
                    commands = self.summary.commands,
                    points = self.summary.points,
                    lines = self.summary.lines,
                    paths = self.summary.paths,
                    "Dispatcher finished"
                );
                Ok(self.summary)
            }
            Err(e) => {
                tracing::error!("Dispatcher halted: {}", e);
                self.queue.close();
                Err(e)
            }
        }
    }

    async fn drain(&mut self) -> Result<(), DispatchError> {
        while let Some(command) = self.queue.pop().await {
            self.handle(command).await?;
        }

        if let Some(stroke) = self.coalescer.finish() {
            tracing::debug!("Queue closed with a pending path, flushing");
            self.execute(stroke).await?;
        }
        Ok(())
    }

    /// Process one dequeued command
    pub async fn handle(&mut self, command: Command) -> Result<(), DispatchError> {
        if !command.is_finite() {
            return Err(DispatchError::InvariantViolation {
                command: command.to_string(),
            });
        }

        self.summary.commands += 1;
        tracing::trace!(%command, "Dequeued");

        for stroke in self.coalescer.feed(command) {
            self.execute(stroke).await?;
        }
        Ok(())
    }

    async fn execute(&mut self, stroke: Stroke) -> Result<(), ActuatorError> {
        tracing::debug!("Drawing {}", stroke);

        match &stroke {
            Stroke::Point(at) => self.actuator.draw_point(*at).await?,
            Stroke::Line(from, to) => self.actuator.draw_line(*from, *to).await?,
            Stroke::Path(edges) => self.actuator.draw_path(edges).await?,
        }

        self.summary.record(&stroke);
        Ok(())
    }

    /// Counters so far
    pub fn summary(&self) -> DispatchSummary {
        self.summary
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}
