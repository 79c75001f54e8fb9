//! TV Guide Fetcher CLI application
//!
//! Command-line interface for fetching XMLTV guide data into the local cache
//! and maintaining that cache.

use std::process;

use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use tvguide_fetcher::cli::{
    handle_clear, handle_expire, handle_fetch, handle_show, handle_status, Cli, Commands,
};
use tvguide_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(&cli);

    info!("TV Guide Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Fetch(args) => handle_fetch(&cli.global, args).await,
        Commands::Show(args) => handle_show(&cli.global, args).await,
        Commands::Status => handle_status(&cli.global).await,
        Commands::Expire(args) => handle_expire(&cli.global, args).await,
        Commands::Clear => handle_clear(&cli.global).await,
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("tvguide_fetcher={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(log_level >= Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
