//! Drawing command model
//!
//! The four wire commands, their validation rules and their wire form:
//!
//! ```text
//! nop
//! point,<x>,<y>
//! line,<x1>,<y1>,<x2>,<y2>
//! polyline,<x1>,<y1>,<x2>,<y2>
//! ```

use crate::error::CommandError;
use std::fmt;
use std::str::FromStr;

/// A position on the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One straight edge of a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: Point2,
    pub to: Point2,
}

impl Edge {
    pub fn new(from: Point2, to: Point2) -> Self {
        Self { from, to }
    }
}

/// A validated drawing command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Draws nothing; terminates an in-progress polyline
    Nop,
    /// A single dab at (x, y)
    Point { x: f64, y: f64 },
    /// A straight stroke from (x1, y1) to (x2, y2)
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// One edge of a multi-edge path; adjacent segments form one stroke
    PolylineSegment { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl Command {
    /// Wire name of this command
    pub fn name(&self) -> &'static str {
        match self {
            Command::Nop => "nop",
            Command::Point { .. } => "point",
            Command::Line { .. } => "line",
            Command::PolylineSegment { .. } => "polyline",
        }
    }

    /// Whether every coordinate is a finite number
    pub fn is_finite(&self) -> bool {
        match *self {
            Command::Nop => true,
            Command::Point { x, y } => x.is_finite() && y.is_finite(),
            Command::Line { x1, y1, x2, y2 } | Command::PolylineSegment { x1, y1, x2, y2 } => {
                [x1, y1, x2, y2].iter().all(|v| v.is_finite())
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Command::Nop => write!(f, "nop"),
            Command::Point { x, y } => write!(f, "point,{},{}", Wire(x), Wire(y)),
            Command::Line { x1, y1, x2, y2 } => write!(
                f,
                "line,{},{},{},{}",
                Wire(x1),
                Wire(y1),
                Wire(x2),
                Wire(y2)
            ),
            Command::PolylineSegment { x1, y1, x2, y2 } => write!(
                f,
                "polyline,{},{},{},{}",
                Wire(x1),
                Wire(y1),
                Wire(x2),
                Wire(y2)
            ),
        }
    }
}

/// Shortest wire form of a coordinate
///
/// Plain decimal for everyday magnitudes, exponent form where plain decimal would
/// run to hundreds of digits. Both parse back to the same value.
struct Wire(f64);

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.abs();
        if magnitude != 0.0 && !(1e-6..1e16).contains(&magnitude) {
            write!(f, "{:e}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s)
    }
}

/// Parse one protocol line into a command
///
/// The line is trimmed, then split on `,`. The first field names the command and
/// the rest are its numeric parameters.
pub fn parse_line(line: &str) -> Result<Command, CommandError> {
    let mut fields = line.trim().split(',');
    let name = fields.next().unwrap_or_default();
    let params: Vec<&str> = fields.collect();

    match name {
        "nop" => {
            expect_arity(name, &params, 0)?;
            Ok(Command::Nop)
        }
        "point" => {
            let [x, y] = parse_params::<2>(name, &params)?;
            Ok(Command::Point { x, y })
        }
        "line" => {
            let [x1, y1, x2, y2] = parse_params::<4>(name, &params)?;
            Ok(Command::Line { x1, y1, x2, y2 })
        }
        "polyline" => {
            let [x1, y1, x2, y2] = parse_params::<4>(name, &params)?;
            Ok(Command::PolylineSegment { x1, y1, x2, y2 })
        }
        other => Err(CommandError::UnknownCommand {
            name: other.to_string(),
        }),
    }
}

fn expect_arity(name: &str, params: &[&str], expected: usize) -> Result<(), CommandError> {
    if params.len() != expected {
        return Err(CommandError::malformed(
            name,
            format!("expected {} parameters, got {}", expected, params.len()),
        ));
    }
    Ok(())
}

fn parse_params<const N: usize>(name: &str, params: &[&str]) -> Result<[f64; N], CommandError> {
    expect_arity(name, params, N)?;

    let mut values = [0.0; N];
    for (slot, raw) in values.iter_mut().zip(params) {
        let raw = raw.trim();
        let value: f64 = raw
            .parse()
            .map_err(|_| CommandError::malformed(name, format!("'{}' is not a number", raw)))?;
        if !value.is_finite() {
            return Err(CommandError::malformed(
                name,
                format!("'{}' is not a finite number", raw),
            ));
        }
        *slot = value;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extreme_coordinates_keep_lines_short() {
        let command = Command::PolylineSegment {
            x1: 1e300,
            y1: -f64::MAX,
            x2: 1e-300,
            y2: f64::MIN_POSITIVE,
        };
        let wire = command.to_string();
        assert!(wire.len() < 128, "{}", wire);
        assert_eq!(parse_line(&wire).unwrap(), command);

        assert_eq!(Command::Point { x: 12.5, y: -0.25 }.to_string(), "point,12.5,-0.25");
        assert_eq!(Command::Point { x: 0.0, y: 1e16 }.to_string(), "point,0,1e16");
    }

    #[test]
    fn test_parse_each_command() {
        assert_eq!(parse_line("nop").unwrap(), Command::Nop);
        assert_eq!(
            parse_line("point,5,5").unwrap(),
            Command::Point { x: 5.0, y: 5.0 }
        );
        assert_eq!(
            parse_line("line,1,2,3,4").unwrap(),
            Command::Line {
                x1: 1.0,
                y1: 2.0,
                x2: 3.0,
                y2: 4.0
            }
        );
        assert_eq!(
            parse_line("polyline,0,0,10.5,-2").unwrap(),
            Command::PolylineSegment {
                x1: 0.0,
                y1: 0.0,
                x2: 10.5,
                y2: -2.0
            }
        );
    }

    #[test]
    fn test_parse_trims_line_and_fields() {
        assert_eq!(parse_line("  nop\r").unwrap(), Command::Nop);
        assert_eq!(
            parse_line("point, 1.5 ,2e1\r\n").unwrap(),
            Command::Point { x: 1.5, y: 20.0 }
        );
    }

    #[test]
    fn test_command_names_are_case_sensitive() {
        let err = parse_line("POINT,1,2").unwrap_err();
        assert_eq!(
            err,
            CommandError::UnknownCommand {
                name: "POINT".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(
            parse_line("circle,1,2,3"),
            Err(CommandError::UnknownCommand { .. })
        ));
        assert!(matches!(
            parse_line(""),
            Err(CommandError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn test_wrong_arity() {
        for line in ["nop,1", "point,1", "point,1,2,3", "line,1,2,3", "polyline,1,2,3,4,5"] {
            assert!(
                matches!(parse_line(line), Err(CommandError::MalformedArguments { .. })),
                "{} should be rejected",
                line
            );
        }
    }

    #[test]
    fn test_non_numeric_parameter() {
        let err = parse_line("point,abc,5").unwrap_err();
        assert_eq!(
            err,
            CommandError::MalformedArguments {
                command: "point".to_string(),
                reason: "'abc' is not a number".to_string(),
            }
        );
        assert!(parse_line("line,1,,3,4").is_err());
    }

    #[test]
    fn test_non_finite_parameter() {
        for line in ["point,nan,1", "point,1,inf", "line,-infinity,0,0,0"] {
            assert!(
                matches!(parse_line(line), Err(CommandError::MalformedArguments { .. })),
                "{} should be rejected",
                line
            );
        }
    }

    #[test]
    fn test_display_wire_form() {
        assert_eq!(Command::Nop.to_string(), "nop");
        assert_eq!(Command::Point { x: 5.0, y: 5.0 }.to_string(), "point,5,5");
        assert_eq!(
            Command::PolylineSegment {
                x1: 0.5,
                y1: 1.0,
                x2: -3.25,
                y2: 4.0
            }
            .to_string(),
            "polyline,0.5,1,-3.25,4"
        );
    }

    #[test]
    fn test_is_finite() {
        assert!(Command::Nop.is_finite());
        assert!(Command::Point { x: 1.0, y: 2.0 }.is_finite());
        assert!(!Command::Line {
            x1: f64::NAN,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0
        }
        .is_finite());
    }
}
