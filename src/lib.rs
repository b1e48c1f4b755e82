//! # Plotkit
//!
//! A line-protocol plotting server. Drawing clients connect over TCP and send
//! `nop`, `point`, `line` and `polyline` commands; the server queues them and drives
//! a pen manipulator, merging consecutive polyline segments into one continuous stroke.
//!
//! ## Architecture
//!
//! 1. **plotkit-core** - Command model, command queue, actuator contract, dispatcher
//! 2. **plotkit-communication** - TCP ingestion listener, pen motion drivers
//! 3. **plotkit-settings** - Configuration files and validation
//! 4. **plotkit** - Binary wiring the pieces together

pub mod cli;

pub use cli::{Cli, LogFormat};

pub use plotkit_communication::{
    GcodeMotion, IngestionListener, ListenerConfig, PenActuator, PenSettings, SimulatedMotion,
};
pub use plotkit_core::{
    Actuator, Command, CommandQueue, DispatchError, DispatchSummary, Dispatcher,
};
pub use plotkit_settings::{Config, PlotterDriver, PlotterSettings, ServerSettings};

use anyhow::Context;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging
///
/// Sets up structured logging with:
/// - RUST_LOG environment variable support (default `info`)
/// - Pretty console output, or one JSON object per line
pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

/// Build the actuator selected by the plotter settings
pub async fn build_actuator(settings: &PlotterSettings) -> anyhow::Result<Box<dyn Actuator>> {
    let pen = PenSettings {
        draw_offset: settings.draw_offset,
        speed: settings.speed,
        acceleration: settings.acceleration,
    };

    let actuator: Box<dyn Actuator> = match settings.driver {
        PlotterDriver::Simulated => {
            let motion = SimulatedMotion::new()
                .with_move_delay(Duration::from_millis(settings.simulated_move_ms));
            Box::new(PenActuator::connect(motion, pen).await?)
        }
        PlotterDriver::Gcode => {
            let motion = GcodeMotion::open(&settings.output, (settings.origin_x, settings.origin_y))
                .await
                .with_context(|| format!("Failed to open G-code output {}", settings.output))?;
            Box::new(PenActuator::connect(motion, pen).await?)
        }
    };

    tracing::info!(driver = %settings.driver, "Pen manipulator connected");
    Ok(actuator)
}

/// A bound ingestion endpoint together with its command queue
pub struct Server {
    listener: IngestionListener,
    queue: Arc<CommandQueue>,
}

impl Server {
    /// Bind the listening endpoint described by `settings`
    pub async fn bind(settings: &ServerSettings) -> anyhow::Result<Self> {
        let queue = Arc::new(CommandQueue::new());
        let config = ListenerConfig {
            max_line_length: settings.max_line_length,
            read_buffer_size: settings.read_buffer_size,
        };
        let listener = IngestionListener::bind(&settings.address(), queue.clone(), config).await?;
        Ok(Self { listener, queue })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn queue(&self) -> Arc<CommandQueue> {
        self.queue.clone()
    }

    /// Ingest and draw until `shutdown` completes or the dispatcher halts
    ///
    /// On shutdown the queue is closed and everything already queued is still drawn.
    pub async fn run_until<A, F>(self, actuator: A, shutdown: F) -> anyhow::Result<DispatchSummary>
    where
        A: Actuator + 'static,
        F: Future<Output = ()>,
    {
        let Self { listener, queue } = self;

        let mut dispatcher = Dispatcher::new(queue.clone(), actuator);
        let mut dispatch = tokio::spawn(async move { dispatcher.run().await });

        tokio::select! {
            result = &mut dispatch => return finish(result),
            result = listener.run() => {
                if let Err(e) = result {
                    tracing::error!("Listener stopped: {}", e);
                }
            }
            _ = shutdown => tracing::info!("Shutdown requested, drawing remaining commands"),
        }

        queue.close();
        finish(dispatch.await)
    }
}

fn finish(
    result: Result<Result<DispatchSummary, DispatchError>, JoinError>,
) -> anyhow::Result<DispatchSummary> {
    let summary = result
        .context("Dispatcher task failed")?
        .context("Dispatcher halted")?;
    Ok(summary)
}

/// Resolves on Ctrl-C; never resolves if the signal handler cannot be installed
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run the server with `config` until Ctrl-C or a fatal dispatcher error
pub async fn run(config: Config) -> anyhow::Result<()> {
    let actuator = build_actuator(&config.plotter).await?;
    let server = Server::bind(&config.server).await?;

    let summary = server.run_until(actuator, shutdown_signal()).await?;
    tracing::info!(
        commands = summary.commands,
        points = summary.points,
        lines = summary.lines,
        paths = summary.paths,
        edges = summary.edges,
        "Server stopped"
    );
    Ok(())
}
