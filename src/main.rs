use clap::Parser;
use plotkit::{init_logging, run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let config = cli.load_config()?;
    tracing::info!("Plotkit {} starting", plotkit::VERSION);

    run(config).await
}
