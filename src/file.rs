use reqwest::{
    header::{HeaderMap, CONTENT_TYPE},
    Url,
};

use crate::error::FetchError;

/// How far into the payload an SVG root may appear.
const SVG_WINDOW: usize = 500;
/// Leading bytes quoted in a signature mismatch diagnostic.
const DIAGNOSTIC_BYTES: usize = 20;
const DEFAULT_EXTENSION: &str = ".png";
const URL_EXTENSIONS: [&str; 7] = [".svg", ".png", ".jpg", ".jpeg", ".gif", ".webp", ".ico"];
const CONTENT_TYPE_EXTENSIONS: [(&[&str], &str); 6] = [
    (&["svg"], ".svg"),
    (&["png"], ".png"),
    (&["jpeg", "jpg"], ".jpg"),
    (&["gif"], ".gif"),
    (&["webp"], ".webp"),
    (&["icon"], ".ico"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
    Svg,
}

pub fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE)?.to_str().ok()
}

/// Decide from the bytes alone whether `payload` is an image.
///
/// HTML documents are rejected first since hosts behind bot protection
/// answer 200 with a challenge page in place of the asset.
pub fn sniff(payload: &[u8], content_type: Option<&str>) -> Result<ImageKind, FetchError> {
    let markup = trim_markup_start(payload);
    if starts_with_ignore_case(markup, b"<!doctype") || starts_with_ignore_case(markup, b"<html") {
        return Err(FetchError::Html);
    }
    if let Some(kind) = binary_kind(payload) {
        return Ok(kind);
    }
    if markup.starts_with(b"<svg") || markup.starts_with(b"<?xml") {
        return Ok(ImageKind::Svg);
    }
    let window = &payload[..payload.len().min(SVG_WINDOW)];
    if window.windows(4).any(|w| w == b"<svg") {
        return Ok(ImageKind::Svg);
    }
    let leading = &payload[..payload.len().min(DIAGNOSTIC_BYTES)];
    Err(FetchError::Unrecognized {
        leading: leading.escape_ascii().to_string(),
        content_type: content_type.unwrap_or("unknown").to_owned(),
    })
}

fn binary_kind(payload: &[u8]) -> Option<ImageKind> {
    if payload.starts_with(b"\x89PNG") {
        Some(ImageKind::Png)
    } else if payload.starts_with(b"\xff\xd8\xff") {
        Some(ImageKind::Jpeg)
    } else if payload.starts_with(b"GIF87a") || payload.starts_with(b"GIF89a") {
        Some(ImageKind::Gif)
    } else if payload.len() >= 12 && payload.starts_with(b"RIFF") && &payload[8..12] == b"WEBP" {
        Some(ImageKind::Webp)
    } else {
        None
    }
}

fn trim_markup_start(payload: &[u8]) -> &[u8] {
    let payload = payload.strip_prefix(b"\xef\xbb\xbf").unwrap_or(payload);
    let start = payload
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(payload.len());
    &payload[start..]
}

fn starts_with_ignore_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// File extension (with the dot) for a stored logo.
///
/// The URL's own suffix wins, then the declared content type, then `.png`.
pub fn extension_for(url: &Url, content_type: Option<&str>) -> &'static str {
    let path = url.path().to_ascii_lowercase();
    if let Some(ext) = URL_EXTENSIONS.iter().copied().find(|ext| path.ends_with(ext)) {
        return ext;
    }
    if let Some(content_type) = content_type {
        let content_type = content_type.to_ascii_lowercase();
        for (needles, ext) in CONTENT_TYPE_EXTENSIONS {
            if needles.iter().any(|needle| content_type.contains(needle)) {
                return ext;
            }
        }
    }
    DEFAULT_EXTENSION
}
