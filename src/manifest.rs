//! TOML manifest: the table of logos to fetch, the ones known to need a
//! manual download, and optional run settings.
//!
//! ```toml
//! output_dir = "public/images/integrations"
//! delay_ms = 1000
//!
//! [[logo]]
//! id = "kareo"
//! url = "/tebranew/_next/static/media/logo_kareo+tebra.svg"
//! base_url = "https://www.tebra.com"
//!
//! [[manual]]
//! id = "jobber"
//! note = "https://getjobber.com/ - 403 Forbidden"
//! ```
use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;

use crate::{config::FetchConfig, request::LogoRequest};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub output_dir: Option<PathBuf>,
    pub public_prefix: Option<String>,
    pub report: Option<PathBuf>,
    pub delay_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub referer: Option<String>,
    #[serde(default, rename = "logo")]
    pub logos: Vec<ManifestLogo>,
    #[serde(default)]
    pub manual: Vec<ManualLogo>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestLogo {
    pub id: String,
    pub url: String,
    pub base_url: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManualLogo {
    pub id: String,
    pub note: String,
    pub name: Option<String>,
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Lay the manifest's settings over `config`.
    pub fn apply(&self, mut config: FetchConfig) -> FetchConfig {
        if let Some(output_dir) = &self.output_dir {
            config = config.output_dir(output_dir.clone());
        }
        if let Some(public_prefix) = &self.public_prefix {
            config = config.public_prefix(public_prefix.clone());
        }
        if let Some(report) = &self.report {
            config = config.report(report.clone());
        }
        if let Some(delay) = self.delay_ms {
            config = config.delay(Duration::from_millis(delay));
        }
        if let Some(timeout) = self.timeout_ms {
            config = config.timeout(Duration::from_millis(timeout));
        }
        if let Some(referer) = &self.referer {
            config = config.referer(referer.clone());
        }
        config
    }

    /// Fetchable logos in order, followed by the manual ones as skips.
    pub fn requests(&self) -> Result<Vec<LogoRequest>> {
        let mut requests = Vec::with_capacity(self.logos.len() + self.manual.len());
        for logo in &self.logos {
            let mut request = LogoRequest::new(&logo.id, &logo.url);
            if let Some(base_url) = &logo.base_url {
                let base_url = Url::parse(base_url)
                    .with_context(|| format!("base_url of logo `{}`", logo.id))?;
                request = request.base_url(base_url);
            }
            if let Some(name) = &logo.name {
                request = request.field("name", name.as_str());
            }
            requests.push(request);
        }
        for manual in &self.manual {
            let mut request = LogoRequest::new(&manual.id, "").skip_note(manual.note.clone());
            if let Some(name) = &manual.name {
                request = request.field("name", name.as_str());
            }
            requests.push(request);
        }
        Ok(requests)
    }
}
