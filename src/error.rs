use std::{io, path::PathBuf};

use thiserror::Error;

/// Why a single logo could not be stored. Never fatal to the batch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("identifier `{0}` is not a plain file name")]
    UnsafeIdentifier(String),
    #[error("received HTML instead of an image")]
    Html,
    #[error("content does not look like an image (first bytes: b\"{leading}\", content type: {content_type})")]
    Unrecognized {
        leading: String,
        content_type: String,
    },
    #[error("failed to write `{}`: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Validation,
    Io,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } | Self::Network(_) => ErrorKind::Network,
            Self::UnsafeIdentifier(_) | Self::Html | Self::Unrecognized { .. } => {
                ErrorKind::Validation
            }
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}
