use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use log::debug;
use logo_fetcher::{config::FetchConfig, request::load_requests, schedule::Scheduler};
use regex::Regex;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let (config, requests) = load_requests(&args.input, FetchConfig::default()).await?;
    let config = args.apply(config)?;

    println!("{}", "=".repeat(60));
    println!("INTEGRATION LOGO DOWNLOADER");
    println!("{}", "=".repeat(60));
    println!("Output directory: {}", config.output_dir.display());
    println!("Loaded {} logos from {}\n", requests.len(), args.input.display());

    let mut scheduler = Scheduler::from_config(config)?;
    for request in requests {
        scheduler.add_pending(request);
    }
    debug!("Starting with {scheduler:#?}.");
    scheduler.run().await;
    scheduler.write_report().await?;
    scheduler.print_summary();
    Ok(())
}

#[derive(Debug, Parser)]
#[clap(
    author,
    version,
    about = "Downloads logos listed in a JSON file or TOML manifest.\n\
Rejects HTML pages served in place of images, stores the rest as\n\
`{id}{extension}` and optionally writes a JSON report."
)]
struct Args {
    #[clap(help = "JSON list of {name, logoUrl, id} objects, or a .toml manifest.")]
    input: PathBuf,
    #[clap(short, long, help = "Directory to save the logos to.")]
    output_dir: Option<PathBuf>,
    #[clap(
        short,
        long,
        help = "Path the site serves the output directory under, for `localPath`."
    )]
    public_prefix: Option<String>,
    #[clap(short, long, help = "Where to write the JSON report.")]
    report: Option<PathBuf>,
    #[clap(
        short,
        long,
        help = "Delay between each request in integer milliseconds."
    )]
    delay: Option<u64>,
    #[clap(
        short,
        long,
        help = "Timeout for each request in integer milliseconds."
    )]
    connection_timeout: Option<u64>,
    #[clap(short, long, help = "Regex to match identifiers that should be included.")]
    filter: Option<String>,
    #[clap(short, long, help = "Regex to match identifiers that should be excluded.")]
    blacklist: Option<String>,
    #[clap(long, help = "Referer header to send with each request.")]
    referer: Option<String>,
}

impl Args {
    fn apply(&self, mut config: FetchConfig) -> Result<FetchConfig> {
        if let Some(output_dir) = &self.output_dir {
            config = config.output_dir(output_dir.clone());
        }
        if let Some(public_prefix) = &self.public_prefix {
            config = config.public_prefix(public_prefix.clone());
        }
        if let Some(report) = &self.report {
            config = config.report(report.clone());
        }
        if let Some(delay) = self.delay {
            config = config.delay(Duration::from_millis(delay));
        }
        if let Some(timeout) = self.connection_timeout {
            config = config.timeout(Duration::from_millis(timeout));
        }
        if let Some(filter) = &self.filter {
            config = config.filter(Regex::new(filter)?);
        }
        if let Some(blacklist) = &self.blacklist {
            config = config.blacklist(Regex::new(blacklist)?);
        }
        if let Some(referer) = &self.referer {
            config = config.referer(referer.clone());
        }
        Ok(config)
    }
}
