use std::{fmt, path::PathBuf};

use chrono::{DateTime, Local};
use serde::{ser::SerializeMap, Serialize};

use crate::{error::FetchError, request::LogoRequest};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Keys the report writes itself; input fields of the same name are dropped.
const REPORT_KEYS: [&str; 6] = [
    "localPath",
    "originalUrl",
    "downloadedAt",
    "fileSize",
    "status",
    "error",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
    Skipped,
}

/// Outcome of one [`LogoRequest`].
///
/// `output_path` is set exactly when the status is [`Status::Success`]:
/// only [`FetchResult::success`] takes a path.
#[derive(Debug, Clone)]
pub struct FetchResult {
    request: LogoRequest,
    status: Status,
    output_path: Option<PathBuf>,
    local_path: Option<String>,
    byte_size: usize,
    error_message: Option<String>,
    downloaded_at: Option<DateTime<Local>>,
}

impl FetchResult {
    pub fn success(
        request: LogoRequest,
        output_path: PathBuf,
        local_path: String,
        byte_size: usize,
    ) -> Self {
        Self {
            request,
            status: Status::Success,
            output_path: Some(output_path),
            local_path: Some(local_path),
            byte_size,
            error_message: None,
            downloaded_at: Some(Local::now()),
        }
    }

    pub fn failed(request: LogoRequest, error: &FetchError, byte_size: usize) -> Self {
        Self {
            request,
            status: Status::Failed,
            output_path: None,
            local_path: None,
            byte_size,
            error_message: Some(error.to_string()),
            downloaded_at: Some(Local::now()),
        }
    }

    pub fn skipped(request: LogoRequest) -> Self {
        let reason = request
            .skip_note
            .clone()
            .unwrap_or_else(|| "no logo URL provided".to_owned());
        Self {
            request,
            status: Status::Skipped,
            output_path: None,
            local_path: None,
            byte_size: 0,
            error_message: Some(reason),
            downloaded_at: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.request.identifier
    }

    pub fn request(&self) -> &LogoRequest {
        &self.request
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output_path.as_ref()
    }

    pub fn local_path(&self) -> Option<&str> {
        self.local_path.as_deref()
    }

    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// One report entry: the input record plus what happened to it.
impl Serialize for FetchResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.request.fields {
            if !REPORT_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        if self.status == Status::Skipped {
            map.serialize_entry("status", &self.status)?;
            if let Some(error) = &self.error_message {
                map.serialize_entry("error", error)?;
            }
            return map.end();
        }
        map.serialize_entry("localPath", &self.local_path)?;
        map.serialize_entry("originalUrl", &self.request.source_url)?;
        if let Some(downloaded_at) = &self.downloaded_at {
            let stamp = downloaded_at.format(TIMESTAMP_FORMAT).to_string();
            map.serialize_entry("downloadedAt", &stamp)?;
        }
        if self.status == Status::Success {
            map.serialize_entry("fileSize", &self.byte_size)?;
        }
        map.serialize_entry("status", &self.status)?;
        if let Some(error) = &self.error_message {
            map.serialize_entry("error", error)?;
        }
        map.end()
    }
}

/// Counts printed at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Tally {
    pub fn from_results(results: &[FetchResult]) -> Self {
        let mut tally = Self::default();
        for result in results {
            match result.status {
                Status::Success => tally.success += 1,
                Status::Failed => tally.failed += 1,
                Status::Skipped => tally.skipped += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.success + self.failed + self.skipped
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Total:     {}", self.total())?;
        writeln!(f, "  Success:   {}", self.success)?;
        writeln!(f, "  Failed:    {}", self.failed)?;
        write!(f, "  Skipped:   {}", self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn acme() -> LogoRequest {
        LogoRequest::new("acme", "https://example.com/logo.png").field("name", "Acme")
    }

    #[test]
    fn success_entry_carries_input_fields() -> anyhow::Result<()> {
        let result = FetchResult::success(
            acme(),
            PathBuf::from("out/acme.png"),
            "/images/integrations/acme.png".to_owned(),
            1234,
        );
        let entry = serde_json::to_value(&result)?;
        assert_eq!(entry["name"], "Acme");
        assert_eq!(entry["id"], "acme");
        assert_eq!(entry["localPath"], "/images/integrations/acme.png");
        assert_eq!(entry["originalUrl"], "https://example.com/logo.png");
        assert_eq!(entry["fileSize"], 1234);
        assert_eq!(entry["status"], "success");
        assert!(entry.get("error").is_none());
        assert!(entry["downloadedAt"].as_str().is_some());
        Ok(())
    }

    #[test]
    fn failed_entry_has_null_path_and_error() -> anyhow::Result<()> {
        let result = FetchResult::failed(acme(), &FetchError::Html, 512);
        assert!(result.output_path().is_none());
        let entry = serde_json::to_value(&result)?;
        assert_eq!(entry["localPath"], Value::Null);
        assert_eq!(entry["status"], "failed");
        assert_eq!(entry["error"], "received HTML instead of an image");
        assert!(entry.get("fileSize").is_none());
        Ok(())
    }

    #[test]
    fn skipped_entry_keeps_note_and_drops_stale_keys() -> anyhow::Result<()> {
        let request = LogoRequest::new("jobber", "")
            .skip_note("403 Forbidden".to_owned())
            .field("status", "stale");
        let entry = serde_json::to_value(FetchResult::skipped(request))?;
        assert_eq!(
            entry,
            json!({"id": "jobber", "logoUrl": "", "status": "skipped", "error": "403 Forbidden"})
        );
        Ok(())
    }

    #[test]
    fn tally_counts_each_status() {
        let results = vec![
            FetchResult::success(acme(), PathBuf::from("a"), "/a".to_owned(), 1),
            FetchResult::failed(acme(), &FetchError::Html, 0),
            FetchResult::failed(acme(), &FetchError::Html, 0),
            FetchResult::skipped(LogoRequest::new("x", "")),
        ];
        let tally = Tally::from_results(&results);
        assert_eq!(
            tally,
            Tally {
                success: 1,
                failed: 2,
                skipped: 1
            }
        );
        assert_eq!(tally.total(), 4);
    }
}
