//! Product Extractor - entry point.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use product_extractor_lib::{RunMode, RunOptions};

#[derive(Parser)]
#[command(
    name = "product-extractor",
    about = "Extract product codes from e-commerce listing pages",
    version
)]
struct Cli {
    /// Path to the JSON config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive session (default).
    Repl,

    /// Extract a single listing page and print its product codes.
    Scrape {
        /// Listing page URL.
        url: String,

        /// Page number to load.
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Write codes to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mode = match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => RunMode::Repl,
        Commands::Scrape { url, page, output } => RunMode::Scrape { url, page, output },
    };

    product_extractor_lib::run(RunOptions {
        config_path: cli.config,
        log_level: cli.log_level,
        mode,
    })
}
