mod catalog;
mod cli;
mod config;
mod download;
mod error;
mod filename;
mod job;
mod parquet;
mod product;
mod remote;

use anyhow::Result;
use clap::Parser;
use cli::{command, Cli, Commands};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Daily(args) => command::daily(args).await,
        Commands::Monthly(args) => command::monthly(args).await,
        Commands::Normals(args) => command::normals(args).await,
        Commands::Catalog(args) => command::catalog(args).await,
    };

    if let Err(e) = report(result) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn report(result: Result<String>) -> Result<()> {
    let message = result?;
    println!("{}", message);

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("prism={}", level)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
