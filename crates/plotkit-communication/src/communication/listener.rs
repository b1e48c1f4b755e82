//! TCP ingestion listener
//!
//! Accepts one drawing client at a time, splits its byte stream into protocol lines,
//! parses them and appends the resulting commands to the shared [`CommandQueue`].
//! Further clients wait in the accept backlog until the current one disconnects.

use super::line_buffer::{LineBuffer, DEFAULT_MAX_LINE_LENGTH};
use plotkit_core::{parse_line, CommandError, CommandQueue, ConnectionError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

/// Pause after a failed accept before trying again
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Configuration for ingestion
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Maximum size of one protocol line in bytes
    pub max_line_length: usize,
    /// Size of each socket read
    pub read_buffer_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            read_buffer_size: 256,
        }
    }
}

/// Per-connection counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Commands appended to the queue
    pub accepted: usize,
    /// Lines rejected as malformed
    pub rejected: usize,
    /// Raw bytes received
    pub bytes: usize,
}

/// Listens for drawing clients and feeds the command queue
pub struct IngestionListener {
    listener: TcpListener,
    queue: Arc<CommandQueue>,
    config: ListenerConfig,
}

impl IngestionListener {
    /// Bind the listening endpoint
    pub async fn bind(
        address: &str,
        queue: Arc<CommandQueue>,
        config: ListenerConfig,
    ) -> Result<Self, ConnectionError> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| ConnectionError::BindFailed {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            listener,
            queue,
            config,
        })
    }

    /// Address actually bound, useful when binding port 0
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve clients one after another until the queue is closed
    pub async fn run(self) -> Result<(), ConnectionError> {
        if let Ok(addr) = self.local_addr() {
            tracing::info!("Server started on {}", addr);
        }

        while !self.queue.is_closed() {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    let err = ConnectionError::AcceptFailed {
                        reason: e.to_string(),
                    };
                    tracing::warn!("{}", err);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };

            let span = tracing::info_span!("connection", %peer, session = %Uuid::new_v4());
            async {
                tracing::info!("Accepted connection from client at {}", peer);
                match serve_connection(stream, &self.queue, &self.config).await {
                    Ok(stats) => tracing::info!(
                        accepted = stats.accepted,
                        rejected = stats.rejected,
                        bytes = stats.bytes,
                        "Connection to client closed"
                    ),
                    Err(e) => tracing::warn!("{}", e),
                }
            }
            .instrument(span)
            .await;
        }

        tracing::info!("Command queue closed, listener stopping");
        Ok(())
    }
}

/// Read one client to end-of-stream, queueing every valid command in order
///
/// Malformed lines are logged and skipped. A read failure ends the connection with
/// [`ConnectionError::ConnectionLost`]; commands queued before it stay queued.
pub async fn serve_connection<R>(
    mut reader: R,
    queue: &CommandQueue,
    config: &ListenerConfig,
) -> Result<ConnectionStats, ConnectionError>
where
    R: AsyncRead + Unpin,
{
    let mut lines = LineBuffer::new(config.max_line_length);
    let mut chunk = vec![0u8; config.read_buffer_size.max(1)];
    let mut stats = ConnectionStats::default();

    loop {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|e| ConnectionError::ConnectionLost {
                reason: e.to_string(),
            })?;

        if n == 0 {
            if lines.pending() > 0 {
                tracing::debug!("Discarding {} bytes of unterminated input", lines.pending());
            }
            return Ok(stats);
        }

        stats.bytes += n;
        lines.extend(&chunk[..n]);

        while let Some(line) = lines.next_line() {
            match line.and_then(|line| parse_nonblank(&line)) {
                Ok(Some(command)) => {
                    if let Err(closed) = queue.push(command) {
                        tracing::error!("{}, closing connection", closed);
                        return Ok(stats);
                    }
                    stats.accepted += 1;
                    tracing::trace!(%command, "Queued");
                }
                Ok(None) => tracing::trace!("Skipping blank line"),
                Err(e) => {
                    stats.rejected += 1;
                    tracing::warn!("{}", e);
                }
            }
        }
    }
}

fn parse_nonblank(line: &str) -> Result<Option<plotkit_core::Command>, CommandError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    parse_line(line).map(Some)
}
