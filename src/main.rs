use anyhow::Result;
use clap::Parser;
use swimdesk::cli::Cli;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise info, or debug with `--verbose`.
/// Logs go to stderr so CSV and JSON on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "swimdesk=debug" } else { "swimdesk=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.run().await
}
