use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::Client;
use std::collections::VecDeque;
use tokio::time::sleep;

use crate::{
    config::FetchConfig,
    fetch::{client_for, fetch_and_store},
    io::save_file,
    request::LogoRequest,
    result::{FetchResult, Status, Tally},
};

/// Runs requests one after another with a fixed pause between fetches.
#[derive(Debug)]
pub struct Scheduler {
    client: Client,
    config: FetchConfig,
    pending: VecDeque<LogoRequest>,
    results: Vec<FetchResult>,
}

impl Scheduler {
    pub fn from_config(config: FetchConfig) -> Result<Self> {
        let client = client_for(&config)?;
        Ok(Self::from_client(client, config))
    }

    pub fn from_client(client: Client, config: FetchConfig) -> Self {
        Self {
            client,
            config,
            pending: VecDeque::new(),
            results: Vec::new(),
        }
    }

    /// Queue `request` unless the filter or blacklist excludes it.
    pub fn add_pending(&mut self, request: LogoRequest) {
        if self.config.selects(&request.identifier) {
            self.pending.push_back(request);
        } else {
            debug!("{}: excluded by filter.", request.identifier);
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn results(&self) -> &[FetchResult] {
        &self.results
    }

    /// Process every pending request in order.
    pub async fn run(&mut self) -> Tally {
        let total = self.results.len() + self.pending.len();
        let mut fetched_before = false;
        while let Some(request) = self.pending.pop_front() {
            // The pause only separates two requests that go over the network.
            if !request.is_skipped() {
                if fetched_before && !self.config.delay.is_zero() {
                    sleep(self.config.delay).await;
                }
                fetched_before = true;
            }
            let index = self.results.len() + 1;
            println!("[{index}/{total}] Processing {}...", request.name());
            let result = fetch_and_store(&self.client, &self.config, request).await;
            print_outcome(&result);
            self.results.push(result);
        }
        Tally::from_results(&self.results)
    }

    /// Write the batch report if one was asked for.
    pub async fn write_report(&self) -> Result<()> {
        let Some(path) = &self.config.report else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&self.results)?;
        save_file(path, json)
            .await
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!("Report written to {}.", path.display());
        Ok(())
    }

    pub fn print_summary(&self) {
        let tally = Tally::from_results(&self.results);
        println!("\n{}", "=".repeat(60));
        println!("DOWNLOAD COMPLETE");
        println!("{}", "=".repeat(60));
        println!("{tally}");

        let failed: Vec<_> = self.with_status(Status::Failed).collect();
        if !failed.is_empty() {
            println!("\n[FAILED] Failed downloads:");
            for result in failed {
                println!("  - {}", result.identifier());
            }
        }
        let manual: Vec<_> = self
            .with_status(Status::Skipped)
            .filter(|result| result.request().skip_note.is_some())
            .collect();
        if !manual.is_empty() {
            println!("\n[MANUAL] Logos requiring manual download:");
            for result in manual {
                println!("  - {}", result.identifier());
                if let Some(note) = &result.request().skip_note {
                    println!("    {note}");
                }
            }
        }
        println!("\nLogos saved to: {}", self.config.output_dir.display());
        if let Some(report) = &self.config.report {
            println!("Results saved to: {}", report.display());
        }
    }

    fn with_status(&self, status: Status) -> impl Iterator<Item = &FetchResult> {
        self.results
            .iter()
            .filter(move |result| result.status() == status)
    }
}

fn print_outcome(result: &FetchResult) {
    let identifier = result.identifier();
    match result.status() {
        Status::Success => {
            let stored = result
                .output_path()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!(
                "  [SUCCESS] {identifier} -> {stored} ({} bytes)",
                result.byte_size()
            );
        }
        Status::Failed => println!(
            "  [ERROR] {identifier}: {}",
            result.error_message().unwrap_or("unknown error")
        ),
        Status::Skipped => println!(
            "  [SKIP] {identifier}: {}",
            result.error_message().unwrap_or("skipped")
        ),
    }
}
