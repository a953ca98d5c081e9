pub mod api;
pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub mod report;
pub mod samples;
pub mod state;
pub mod store;

pub use api::{ApiClient, DetectionResult, ImagePayload, Metrics, NailDetail};
pub use backend::{Backend, BackendEndpoints, BackendSelector};
pub use error::{NailedItError, Result};
pub use state::AppState;

/// Install the log subscriber. Logs go to stderr so command output stays
/// clean on stdout.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Parse the command line and run it.
pub async fn run() -> anyhow::Result<()> {
    use clap::Parser;

    init_tracing();
    cli::execute(cli::Cli::parse()).await
}
