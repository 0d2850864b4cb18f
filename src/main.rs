use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use taucoder::commands::{run_images, RunOptions};
use taucoder::models::ConfigOverrides;

/// taucoder - upload images for encoding and download the results
#[derive(Parser)]
#[command(name = "taucoder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API key for the taucoder service
    #[arg(long)]
    apikey: Option<String>,

    /// Existing directory that receives the encoded images
    #[arg(long)]
    output: Option<PathBuf>,

    /// Images to encode
    input: Vec<PathBuf>,

    /// Config file (defaults to ./taucoder.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override the encoder version
    #[arg(long)]
    encoder_version: Option<String>,

    /// Override the output quality (0-100)
    #[arg(long)]
    quality: Option<u8>,

    /// Override the seconds between status polls
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprint!("{}", e);
            std::process::exit(1);
        }
    };

    // Set up logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();

    let working_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let options = RunOptions {
        apikey: cli.apikey,
        output: cli.output,
        inputs: cli.input,
        config: cli.config,
        overrides: ConfigOverrides {
            base_url: cli.base_url,
            encoder_version: cli.encoder_version,
            quality: cli.quality,
            poll_interval: cli.poll_interval,
        },
    };

    if let Err(e) = run_images(&working_dir, options).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
