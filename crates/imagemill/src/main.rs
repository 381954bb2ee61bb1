//! Imagemill CLI - concurrent batch image processing.
//!
//! Applies a single transform (rotate, resize, grayscale, blur) to every
//! supported image in a folder and writes the results to an output
//! folder, optionally re-encoding along the way.
//!
//! # Usage
//!
//! ```bash
//! # Resize every image to 128x128 JPEGs
//! imagemill ./photos ./out --task resize
//!
//! # Transcode to WebP while converting to grayscale
//! imagemill ./photos ./out --task grayscale --format webp --quality 70
//!
//! # Fix EXIF rotation in place of a stale orientation tag
//! imagemill ./photos ./out --task rotate
//! ```

use clap::Parser;

mod cli;
mod logging;

/// Imagemill - concurrent batch image processing.
#[derive(Parser, Debug)]
#[command(name = "imagemill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,

    #[command(flatten)]
    run: cli::RunArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match imagemill_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {e}\n  Using default configuration.");
            imagemill_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Imagemill v{}", imagemill_core::VERSION);

    cli::execute(cli.run, &config).await
}
