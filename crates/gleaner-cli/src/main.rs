//! gleaner CLI - incremental catalog harvesting over HTTP.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gleaner_core::DEFAULT_BUFFER_SECS;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "gleaner")]
#[command(author, version, about = "Incremental catalog harvesting service")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the harvest HTTP server over NDJSON change feeds
    Serve {
        /// NDJSON feed of recording changes
        #[arg(long)]
        recordings: PathBuf,

        /// NDJSON feed of collection changes
        #[arg(long)]
        collections: PathBuf,

        /// Port to listen on
        #[arg(long, short = 'p', default_value = "17878")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Watermark safety buffer in seconds
        #[arg(long, default_value_t = DEFAULT_BUFFER_SECS)]
        buffer_secs: i64,
    },

    /// Run a single harvest against local feeds and print the response
    Harvest {
        /// NDJSON feed of recording changes
        #[arg(long)]
        recordings: PathBuf,

        /// NDJSON feed of collection changes
        #[arg(long)]
        collections: PathBuf,

        /// Checkpoint in milliseconds since epoch
        #[arg(long, default_value = "0")]
        since: i64,

        /// Soft target for the number of items per entity kind
        #[arg(long, default_value = "100")]
        preferred_amount: usize,

        /// Watermark safety buffer in seconds
        #[arg(long, default_value_t = DEFAULT_BUFFER_SECS)]
        buffer_secs: i64,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            recordings,
            collections,
            port,
            host,
            buffer_secs,
        } => commands::serve(&recordings, &collections, &host, port, buffer_secs),
        Commands::Harvest {
            recordings,
            collections,
            since,
            preferred_amount,
            buffer_secs,
        } => commands::harvest(
            &recordings,
            &collections,
            since,
            preferred_amount,
            buffer_secs,
        ),
    }
}
