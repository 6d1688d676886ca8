use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use exif_harvest::{Config, Ingester};

#[derive(Parser)]
#[command(name = "exif-harvest")]
#[command(about = "Mirror a JPEG bucket locally and store each image's EXIF fields by content hash")]
#[command(version)]
struct Cli {
    /// JSON configuration file (falls back to $EXIF_HARVEST_CONFIG, then defaults)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the number of items processed at once
    #[arg(long)]
    max_concurrent: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    if let Some(max_concurrent) = cli.max_concurrent {
        config.download.max_concurrent = max_concurrent;
    }

    let ingester = match Ingester::open(config).await {
        Ok(ingester) => ingester,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    match ingester.run().await {
        Ok(report) => {
            println!(
                "discovered {}, skipped {}, stored {}, failed {}",
                report.discovered, report.skipped, report.stored, report.failed
            );
            for (name, reason) in &report.failures {
                println!("  {}: {}", name, reason);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
