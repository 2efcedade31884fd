use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(rainbow_run::LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    rainbow_run::Cli::parse().run()
}
