mod config;
mod display;
mod prompt;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lotcheck_core::Session;
use lotcheck_sync::CheckStation;
use tracing::Level;

use crate::config::Config;
use crate::prompt::Station;

#[derive(Parser, Debug)]
#[command(name = "lotcheck", version, about = "Scan-based order verification station")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive check station (default).
    Check {
        /// Document number or NF-e access key to open right away.
        document: Option<String>,
    },
    /// Fetch a document and print its lines and checklist without checking.
    Lookup { document: String },
    /// List the client directory.
    Clients,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if config.verbose {
            Level::INFO
        } else {
            Level::WARN
        })
        .init();
    tracing::info!("lotcheck v{}", env!("CARGO_PKG_VERSION"));

    let directory = config.directory()?;
    let client = config.initial_client(&directory)?;

    match cli.command.unwrap_or(Command::Check { document: None }) {
        Command::Clients => {
            display::print_clients(directory.clients(), Some(&client));
        }
        Command::Lookup { document } => {
            let mut station = CheckStation::new(
                config.order_client(),
                lotcheck_sync::DiscardLog,
                Session::new(client),
            );
            let summary = station
                .search(&document)
                .await
                .with_context(|| format!("looking up document {document}"))?;
            println!("=== document {} ===", summary.document);
            display::print_order(station.session().lines());
            println!();
            display::print_progress(station.session());
        }
        Command::Check { document } => {
            let inner = CheckStation::new(
                config.order_client(),
                config.confirmation_sink()?,
                Session::new(client),
            );
            let mut station = Station {
                inner,
                directory,
                out_dir: config.out_dir.clone(),
                report: config.report_options(),
                keep_after_export: config.keep_after_export,
                bell: !config.no_bell,
            };
            if let Some(document) = document {
                if let Err(e) = station.open(&document).await {
                    eprintln!("  ✗ {e:#}");
                }
            }
            station.run().await?;
        }
    }
    Ok(())
}
