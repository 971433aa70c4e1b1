use std::path::{Component, Path};

use anyhow::{bail, Context, Result};
use log::warn;
use reqwest::Url;
use serde_json::{Map, Value};

use crate::{
    config::{FetchConfig, DEFAULT_REFERER},
    error::FetchError,
    manifest::Manifest,
};

const UNKNOWN: &str = "unknown";

/// One logo to fetch. `fields` holds the input record as read, so the
/// report can echo it back.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoRequest {
    pub identifier: String,
    pub source_url: String,
    pub base_url: Option<Url>,
    pub skip_note: Option<String>,
    pub fields: Map<String, Value>,
}

impl LogoRequest {
    pub fn new(identifier: impl Into<String>, source_url: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let source_url = source_url.into();
        let mut fields = Map::new();
        fields.insert("id".to_owned(), Value::from(identifier.as_str()));
        fields.insert("logoUrl".to_owned(), Value::from(source_url.as_str()));
        Self {
            identifier,
            source_url,
            base_url: None,
            skip_note: None,
            fields,
        }
    }

    pub fn base_url(self, base_url: Url) -> Self {
        Self {
            base_url: Some(base_url),
            ..self
        }
    }

    pub fn skip_note(self, skip_note: String) -> Self {
        Self {
            skip_note: Some(skip_note),
            ..self
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_owned(), value.into());
        self
    }

    /// Build a request from one object of the JSON input list.
    ///
    /// `id` names the file; without one the `name` is turned into a slug.
    pub fn from_record(fields: Map<String, Value>) -> Self {
        let name = fields.get("name").and_then(Value::as_str).unwrap_or(UNKNOWN);
        let identifier = match fields.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_owned(),
            Some(Value::Number(id)) => id.to_string(),
            None | Some(Value::Null) | Some(Value::String(_)) => sanitize_identifier(name),
            Some(other) => {
                warn!("{name}: ignoring id {other}, using the name instead.");
                sanitize_identifier(name)
            }
        };
        let source_url = fields
            .get("logoUrl")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_owned();
        Self {
            identifier,
            source_url,
            base_url: None,
            skip_note: None,
            fields,
        }
    }

    /// Display name for progress lines.
    pub fn name(&self) -> &str {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(self.identifier.as_str())
    }

    pub fn is_skipped(&self) -> bool {
        self.source_url.trim().is_empty()
    }

    /// The identifier becomes a file name inside the output directory, so it
    /// must be a single plain path component.
    pub fn check_identifier(&self) -> Result<(), FetchError> {
        let id = self.identifier.as_str();
        let mut components = Path::new(id).components();
        let plain = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none()
            && !id.contains(['/', '\\']);
        if plain {
            Ok(())
        } else {
            Err(FetchError::UnsafeIdentifier(id.to_owned()))
        }
    }

    /// The absolute URL to fetch, joining relative sources onto `base_url`.
    pub fn resolve_url(&self) -> Result<Url, FetchError> {
        let source = self.source_url.trim();
        // Joining an absolute URL onto a base yields the URL unchanged.
        let parsed = match &self.base_url {
            Some(base) => base.join(source),
            None => Url::parse(source),
        };
        parsed.map_err(|err| FetchError::InvalidUrl {
            url: source.to_owned(),
            reason: err.to_string(),
        })
    }
}

/// Lowercase slug of a company name, e.g. `"Monday.com (CRM)"` becomes
/// `"monday-com-crm"`. Never empty.
pub fn sanitize_identifier(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        match c {
            ' ' | '.' | '-' => {
                if !slug.ends_with('-') {
                    slug.push('-');
                }
            }
            c if c.is_alphanumeric() => slug.push(c),
            _ => {}
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        UNKNOWN.to_owned()
    } else {
        slug.to_owned()
    }
}

/// Load the requests from `path`, a `.toml` manifest or a JSON list,
/// laying any manifest settings over `config`.
///
/// JSON input sends the Google referer unless `config` names another one.
pub async fn load_requests(
    path: &Path,
    config: FetchConfig,
) -> Result<(FetchConfig, Vec<LogoRequest>)> {
    if !path.is_file() {
        bail!("Input file not found: {}", path.display());
    }
    let is_manifest = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));
    if is_manifest {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let manifest =
            Manifest::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
        Ok((manifest.apply(config), manifest.requests()?))
    } else {
        let config = match config.referer {
            Some(_) => config,
            None => config.referer(DEFAULT_REFERER.to_owned()),
        };
        Ok((config, load_json_requests(path).await?))
    }
}

/// Read the JSON input: an array of objects with `name`, `logoUrl` and
/// optionally `id`.
pub async fn load_json_requests(path: &Path) -> Result<Vec<LogoRequest>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    parse_json_requests(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_json_requests(text: &str) -> Result<Vec<LogoRequest>> {
    let records: Vec<Value> = serde_json::from_str(text)?;
    let mut requests = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match record {
            Value::Object(fields) => requests.push(LogoRequest::from_record(fields)),
            other => bail!("entry {index} is not an object: {other}"),
        }
    }
    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_identifier("Follow Up Boss"), "follow-up-boss");
        assert_eq!(sanitize_identifier("Monday.com (CRM)"), "monday-com-crm");
        assert_eq!(sanitize_identifier("  Zoho -- CRM  "), "zoho-crm");
        assert_eq!(sanitize_identifier("AT&T"), "att");
        assert_eq!(sanitize_identifier("???"), "unknown");
    }

    #[test]
    fn record_prefers_id_over_name() -> Result<()> {
        let requests = parse_json_requests(
            r#"[
                {"name": "Acme", "logoUrl": "https://example.com/logo.png", "id": "acme"},
                {"name": "House Call Pro", "logoUrl": " https://example.com/hcp.svg "},
                {"logoUrl": ""}
            ]"#,
        )?;
        assert_eq!(requests[0].identifier, "acme");
        assert_eq!(requests[1].identifier, "house-call-pro");
        assert_eq!(requests[1].source_url, "https://example.com/hcp.svg");
        assert_eq!(requests[2].identifier, "unknown");
        assert!(requests[2].is_skipped());
        assert_eq!(requests[1].name(), "House Call Pro");
        Ok(())
    }

    #[test]
    fn numeric_ids_are_kept() -> Result<()> {
        let requests = parse_json_requests(
            r#"[
                {"name": "Acme", "logoUrl": "", "id": 42},
                {"name": "Odd Co", "logoUrl": "", "id": ["x"]}
            ]"#,
        )?;
        assert_eq!(requests[0].identifier, "42");
        assert_eq!(requests[1].identifier, "odd-co");
        Ok(())
    }

    #[test]
    fn identifiers_must_be_plain_file_names() {
        for id in ["acme", "follow-up-boss", "42", "logo.v2"] {
            assert!(LogoRequest::new(id, "").check_identifier().is_ok(), "{id}");
        }
        for id in ["../escaped", "a/b", "a\\b", "..", ".", "/abs", ""] {
            assert!(
                matches!(
                    LogoRequest::new(id, "").check_identifier(),
                    Err(FetchError::UnsafeIdentifier(_))
                ),
                "{id}"
            );
        }
    }

    #[test]
    fn rejects_non_object_entries() {
        assert!(parse_json_requests(r#"[{"name": "ok"}, 3]"#).is_err());
        assert!(parse_json_requests(r#"{"name": "not a list"}"#).is_err());
    }

    #[test]
    fn resolves_relative_urls_against_base() -> Result<()> {
        let request = LogoRequest::new("kareo", "/tebranew/_next/static/media/logo.svg")
            .base_url(Url::parse("https://www.tebra.com")?);
        assert_eq!(
            request.resolve_url()?.as_str(),
            "https://www.tebra.com/tebranew/_next/static/media/logo.svg"
        );

        let absolute = LogoRequest::new("clio", "https://www.clio.com/logo.svg")
            .base_url(Url::parse("https://elsewhere.example")?);
        assert_eq!(absolute.resolve_url()?.host_str(), Some("www.clio.com"));

        let orphan = LogoRequest::new("orphan", "/logo.svg");
        assert!(matches!(
            orphan.resolve_url(),
            Err(FetchError::InvalidUrl { .. })
        ));
        Ok(())
    }
}
