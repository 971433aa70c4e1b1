use regex::Regex;
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_OUTPUT_DIR: &str = "public/images/integrations";
pub const DEFAULT_PUBLIC_PREFIX: &str = "/images/integrations";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
/// Sent with JSON-driven runs unless another referer is configured.
pub const DEFAULT_REFERER: &str = "https://www.google.com/";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub delay: Duration,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    /// Prefix under which the site serves `output_dir`, used for `localPath`.
    pub public_prefix: String,
    pub report: Option<PathBuf>,
    pub filter: Option<Regex>,
    pub blacklist: Option<Regex>,
    pub referer: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            public_prefix: DEFAULT_PUBLIC_PREFIX.to_owned(),
            report: None,
            filter: None,
            blacklist: None,
            referer: None,
        }
    }
}

impl FetchConfig {
    pub fn delay(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn output_dir<P: Into<PathBuf>>(self, output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..self
        }
    }

    pub fn public_prefix(self, public_prefix: String) -> Self {
        Self {
            public_prefix,
            ..self
        }
    }

    pub fn report<P: Into<PathBuf>>(self, report: P) -> Self {
        Self {
            report: Some(report.into()),
            ..self
        }
    }

    pub fn filter(self, filter: Regex) -> Self {
        Self {
            filter: Some(filter),
            ..self
        }
    }

    pub fn blacklist(self, blacklist: Regex) -> Self {
        Self {
            blacklist: Some(blacklist),
            ..self
        }
    }

    pub fn referer(self, referer: String) -> Self {
        Self {
            referer: Some(referer),
            ..self
        }
    }

    /// Whether an identifier passes both `filter` and `blacklist`.
    pub fn selects(&self, identifier: &str) -> bool {
        if let Some(filter) = &self.filter {
            if !filter.is_match(identifier) {
                return false;
            }
        }
        match &self.blacklist {
            Some(blacklist) => !blacklist.is_match(identifier),
            None => true,
        }
    }

    /// Public path of a stored file, e.g. `/images/integrations/acme.png`.
    pub fn public_path(&self, filename: &str) -> String {
        format!("{}/{filename}", self.public_prefix.trim_end_matches('/'))
    }
}
