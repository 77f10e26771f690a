//! Mull CLI entry point

use clap::Parser;
use mull_cli::{Cli, ErrorPayload};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_filter = if cli.verbose {
        "mull=debug,mull_cli=debug,mull_store=debug"
    } else {
        "mull=warn,mull_cli=warn,mull_store=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = mull_cli::run(cli, &mut out) {
        tracing::debug!("command failed: {:?}", e);
        let payload = ErrorPayload::from_error(&e);
        match serde_json::to_string(&payload) {
            Ok(line) => eprintln!("{line}"),
            Err(_) => eprintln!("{}", payload.error),
        }
        std::process::exit(1);
    }
}
