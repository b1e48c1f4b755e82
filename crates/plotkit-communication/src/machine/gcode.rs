//! G-code motion output
//!
//! Streams pen moves as G-code for a GRBL-style controller. Surface coordinates are
//! shifted by the configured origin, and the surface frame's `z` (pointing into the
//! surface) is negated so the standoff height becomes a positive machine Z.
//!
//! Moves that end in contact with the surface are feed moves (`G1`), all others
//! are rapids (`G0`).
//!
//! When a reply stream is attached (networked controllers), each line is held until
//! the controller answers `ok`. Only one line is ever in flight, so GRBL's receive
//! buffer cannot overflow. `error:` and `ALARM` replies fail the move.

use super::{MotionSink, PenPosition};
use async_trait::async_trait;
use plotkit_core::ActuatorError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;

/// Output target used for "write to stdout"
pub const STDOUT_TARGET: &str = "-";

/// Prefix selecting a networked controller
pub const TCP_PREFIX: &str = "tcp://";

type Replies = Box<dyn AsyncBufRead + Unpin + Send>;

/// Writes G-code for every pen move
pub struct GcodeMotion<W> {
    out: W,
    replies: Option<Replies>,
    origin: (f64, f64),
    /// Feed rate in mm/min
    feed_rate: f64,
    lines_written: u64,
}

impl GcodeMotion<Box<dyn AsyncWrite + Unpin + Send>> {
    /// Open an output target: `-` for stdout, `tcp://host:port` for a networked
    /// controller, anything else is a file path to create
    pub async fn open(target: &str, origin: (f64, f64)) -> Result<Self, ActuatorError> {
        let motion = if target == STDOUT_TARGET {
            Self::new(Box::new(tokio::io::stdout()), origin)
        } else if let Some(address) = target.strip_prefix(TCP_PREFIX) {
            let stream = TcpStream::connect(address)
                .await
                .map_err(|e| ActuatorError::NotReady {
                    reason: format!("cannot reach controller at {}: {}", address, e),
                })?;
            stream.set_nodelay(true)?;
            let (read, write) = stream.into_split();
            Self::new(Box::new(write), origin).with_replies(BufReader::new(read))
        } else {
            let file = tokio::fs::File::create(target)
                .await
                .map_err(|e| ActuatorError::NotReady {
                    reason: format!("cannot create {}: {}", target, e),
                })?;
            Self::new(Box::new(BufWriter::new(file)), origin)
        };

        tracing::info!("Writing G-code to {}", target);
        Ok(motion)
    }
}

impl<W: AsyncWrite + Unpin + Send> GcodeMotion<W> {
    pub fn new(out: W, origin: (f64, f64)) -> Self {
        Self {
            out,
            replies: None,
            origin,
            feed_rate: 0.0,
            lines_written: 0,
        }
    }

    /// Wait for the controller's answer on `replies` after every line
    pub fn with_replies<R>(mut self, replies: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        self.replies = Some(Box::new(replies));
        self
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    async fn send(&mut self, line: &str) -> Result<(), ActuatorError> {
        tracing::trace!("G-code: {}", line);
        self.out.write_all(line.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        self.lines_written += 1;

        if let Some(replies) = self.replies.as_mut() {
            await_ok(replies, line).await?;
        }
        Ok(())
    }
}

/// Read controller replies until the one that answers `sent`
async fn await_ok(replies: &mut Replies, sent: &str) -> Result<(), ActuatorError> {
    let mut buf = String::new();
    loop {
        buf.clear();
        if replies.read_line(&mut buf).await? == 0 {
            return Err(ActuatorError::NotReady {
                reason: "controller closed the connection".to_string(),
            });
        }

        let reply = buf.trim();
        if reply == "ok" {
            return Ok(());
        }
        if reply.starts_with("error:") || reply.starts_with("ALARM") {
            tracing::error!("GRBL {} after '{}'", reply, sent);
            return Err(ActuatorError::MotionFailed {
                reason: format!("controller answered '{}' to '{}'", reply, sent),
            });
        }
        // Welcome banner, [MSG:...], status reports
        tracing::debug!("GRBL message: {}", reply);
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> MotionSink for GcodeMotion<W> {
    async fn configure(&mut self, speed: f64, acceleration: f64) -> Result<(), ActuatorError> {
        self.feed_rate = speed * 60.0;

        self.send("G21").await?;
        self.send("G90").await?;
        // GRBL X/Y acceleration settings
        self.send(&format!("$120={:.1}", acceleration)).await?;
        self.send(&format!("$121={:.1}", acceleration)).await?;
        Ok(())
    }

    async fn move_pen_to(&mut self, target: PenPosition) -> Result<(), ActuatorError> {
        let x = self.origin.0 + target.x;
        let y = self.origin.1 + target.y;
        let line = if target.z == 0.0 {
            format!("G1 X{:.3} Y{:.3} Z0.000 F{:.0}", x, y, self.feed_rate)
        } else {
            format!("G0 X{:.3} Y{:.3} Z{:.3}", x, y, -target.z)
        };
        self.send(&line).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, DuplexStream};

    fn capture(origin: (f64, f64)) -> (GcodeMotion<DuplexStream>, DuplexStream) {
        let (out, sink) = tokio::io::duplex(64 * 1024);
        (GcodeMotion::new(out, origin), sink)
    }

    async fn output(motion: GcodeMotion<DuplexStream>, mut sink: DuplexStream) -> Vec<String> {
        drop(motion);
        let mut text = String::new();
        sink.read_to_string(&mut text).await.unwrap();
        text.lines().map(str::to_string).collect()
    }

    #[tokio::test]
    async fn test_configure_writes_preamble() {
        let (mut motion, sink) = capture((0.0, 0.0));
        motion.configure(300.0, 5000.0).await.unwrap();
        assert_eq!(motion.lines_written(), 4);
        assert_eq!(
            output(motion, sink).await,
            vec!["G21", "G90", "$120=5000.0", "$121=5000.0"]
        );
    }

    #[tokio::test]
    async fn test_contact_moves_are_feed_moves() {
        let (mut motion, sink) = capture((100.0, 50.0));
        motion.configure(10.0, 500.0).await.unwrap();
        motion
            .move_pen_to(PenPosition::new(1.0, 2.0, -30.0))
            .await
            .unwrap();
        motion
            .move_pen_to(PenPosition::new(1.0, 2.0, 0.0))
            .await
            .unwrap();

        let lines = output(motion, sink).await;
        assert_eq!(lines[4], "G0 X101.000 Y52.000 Z30.000");
        assert_eq!(lines[5], "G1 X101.000 Y52.000 Z0.000 F600");
    }

    #[tokio::test]
    async fn test_write_failure_is_an_actuator_error() {
        let (mut motion, sink) = capture((0.0, 0.0));
        drop(sink);
        let err = motion
            .move_pen_to(PenPosition::new(0.0, 0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ActuatorError::Io { .. }));
    }

    #[tokio::test]
    async fn test_ok_replies_acknowledge_lines() {
        let (motion, _sink) = capture((0.0, 0.0));
        let mut motion =
            motion.with_replies(&b"Grbl 1.1h ['$' for help]\r\nok\r\n[MSG:Pgm End]\r\nok\r\n"[..]);

        motion
            .move_pen_to(PenPosition::new(0.0, 0.0, -5.0))
            .await
            .unwrap();
        motion
            .move_pen_to(PenPosition::new(0.0, 0.0, 0.0))
            .await
            .unwrap();
        assert_eq!(motion.lines_written(), 2);
    }

    #[tokio::test]
    async fn test_error_reply_fails_the_move() {
        let (motion, _sink) = capture((0.0, 0.0));
        let mut motion = motion.with_replies(&b"ok\r\nerror:9\r\n"[..]);

        motion
            .move_pen_to(PenPosition::new(0.0, 0.0, -5.0))
            .await
            .unwrap();
        let err = motion
            .move_pen_to(PenPosition::new(0.0, 0.0, 0.0))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, ActuatorError::MotionFailed { reason } if reason.contains("error:9"))
        );
    }

    #[tokio::test]
    async fn test_alarm_reply_fails_the_move() {
        let (motion, _sink) = capture((0.0, 0.0));
        let mut motion = motion.with_replies(&b"ALARM:1\r\n"[..]);
        let err = motion.configure(300.0, 5000.0).await.unwrap_err();
        assert!(matches!(err, ActuatorError::MotionFailed { .. }));
        assert_eq!(motion.lines_written(), 1);
    }

    #[tokio::test]
    async fn test_silent_controller_disconnect_is_not_ready() {
        let (motion, _sink) = capture((0.0, 0.0));
        let mut motion = motion.with_replies(&b""[..]);
        let err = motion
            .move_pen_to(PenPosition::new(0.0, 0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ActuatorError::NotReady { .. }));
    }
}
