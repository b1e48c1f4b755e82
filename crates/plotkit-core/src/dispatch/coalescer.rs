//! Polyline coalescing state machine
//!
//! Consecutive `PolylineSegment` commands accumulate into one path. The path is
//! flushed as soon as any other command arrives, and that command is then handled
//! as if the coalescer were idle.

use crate::command::{Command, Edge, Point2};
use std::fmt;

/// One continuous surface-contact motion
#[derive(Debug, Clone, PartialEq)]
pub enum Stroke {
    Point(Point2),
    Line(Point2, Point2),
    Path(Vec<Edge>),
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stroke::Point(at) => write!(f, "point at {}", at),
            Stroke::Line(from, to) => write!(f, "line from {} to {}", from, to),
            Stroke::Path(edges) => write!(f, "path of {} edges", edges.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum CoalescerState {
    #[default]
    Idle,
    AccumulatingPath(Vec<Edge>),
}

/// Turns the command stream into strokes
#[derive(Debug, Default)]
pub struct Coalescer {
    state: CoalescerState,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next command, yielding the strokes that are now ready in order
    ///
    /// Yields at most two strokes: a flushed path followed by the stroke for
    /// `command` itself.
    pub fn feed(&mut self, command: Command) -> impl Iterator<Item = Stroke> {
        let immediate = match command {
            Command::PolylineSegment { x1, y1, x2, y2 } => {
                let edge = Edge::new(Point2::new(x1, y1), Point2::new(x2, y2));
                if let CoalescerState::AccumulatingPath(edges) = &mut self.state {
                    edges.push(edge);
                } else {
                    self.state = CoalescerState::AccumulatingPath(vec![edge]);
                }
                return None::<Stroke>.into_iter().chain(None::<Stroke>);
            }
            Command::Nop => None,
            Command::Point { x, y } => Some(Stroke::Point(Point2::new(x, y))),
            Command::Line { x1, y1, x2, y2 } => {
                Some(Stroke::Line(Point2::new(x1, y1), Point2::new(x2, y2)))
            }
        };

        self.finish().into_iter().chain(immediate)
    }

    /// Flush the accumulated path, if any, and return to idle
    pub fn finish(&mut self) -> Option<Stroke> {
        match std::mem::take(&mut self.state) {
            CoalescerState::Idle => None,
            CoalescerState::AccumulatingPath(edges) => Some(Stroke::Path(edges)),
        }
    }

    pub fn is_accumulating(&self) -> bool {
        matches!(self.state, CoalescerState::AccumulatingPath(_))
    }

    /// Number of edges waiting to be flushed
    pub fn pending_edges(&self) -> usize {
        match &self.state {
            CoalescerState::Idle => 0,
            CoalescerState::AccumulatingPath(edges) => edges.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(x1: f64, y1: f64, x2: f64, y2: f64) -> Command {
        Command::PolylineSegment { x1, y1, x2, y2 }
    }

    fn feed_all(coalescer: &mut Coalescer, commands: &[Command]) -> Vec<Stroke> {
        commands
            .iter()
            .flat_map(|c| coalescer.feed(*c).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_idle_commands_dispatch_immediately() {
        let mut coalescer = Coalescer::new();
        let strokes = feed_all(
            &mut coalescer,
            &[
                Command::Point { x: 1.0, y: 2.0 },
                Command::Nop,
                Command::Line {
                    x1: 1.0,
                    y1: 2.0,
                    x2: 3.0,
                    y2: 4.0,
                },
            ],
        );
        assert_eq!(
            strokes,
            vec![
                Stroke::Point(Point2::new(1.0, 2.0)),
                Stroke::Line(Point2::new(1.0, 2.0), Point2::new(3.0, 4.0)),
            ]
        );
        assert!(!coalescer.is_accumulating());
    }

    #[test]
    fn test_segments_accumulate_until_nop() {
        let mut coalescer = Coalescer::new();
        let strokes = feed_all(
            &mut coalescer,
            &[segment(0.0, 0.0, 1.0, 0.0), segment(1.0, 0.0, 1.0, 1.0)],
        );
        assert!(strokes.is_empty());
        assert!(coalescer.is_accumulating());
        assert_eq!(coalescer.pending_edges(), 2);

        let strokes: Vec<_> = coalescer.feed(Command::Nop).collect();
        assert_eq!(
            strokes,
            vec![Stroke::Path(vec![
                Edge::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
                Edge::new(Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)),
            ])]
        );
        assert!(!coalescer.is_accumulating());
    }

    #[test]
    fn test_flush_precedes_triggering_command() {
        let mut coalescer = Coalescer::new();
        let strokes = feed_all(
            &mut coalescer,
            &[segment(0.0, 0.0, 2.0, 2.0), Command::Point { x: 5.0, y: 5.0 }],
        );
        assert_eq!(
            strokes,
            vec![
                Stroke::Path(vec![Edge::new(
                    Point2::new(0.0, 0.0),
                    Point2::new(2.0, 2.0)
                )]),
                Stroke::Point(Point2::new(5.0, 5.0)),
            ]
        );
    }

    #[test]
    fn test_separate_runs_are_separate_paths() {
        let mut coalescer = Coalescer::new();
        let strokes = feed_all(
            &mut coalescer,
            &[
                segment(0.0, 0.0, 1.0, 1.0),
                Command::Nop,
                segment(2.0, 2.0, 3.0, 3.0),
                segment(3.0, 3.0, 4.0, 4.0),
                Command::Nop,
            ],
        );
        assert_eq!(strokes.len(), 2);
        assert!(matches!(&strokes[0], Stroke::Path(e) if e.len() == 1));
        assert!(matches!(&strokes[1], Stroke::Path(e) if e.len() == 2));
    }

    #[test]
    fn test_finish_flushes_pending_path() {
        let mut coalescer = Coalescer::new();
        assert_eq!(coalescer.finish(), None);

        let _ = coalescer.feed(segment(0.0, 0.0, 1.0, 1.0)).count();
        assert!(matches!(coalescer.finish(), Some(Stroke::Path(e)) if e.len() == 1));
        assert_eq!(coalescer.finish(), None);
    }
}
