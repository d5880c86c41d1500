use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    // Network errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid index URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // Index parsing errors
    #[error("Failed to parse package index: {0}")]
    Parse(String),

    // Archive errors
    #[error("Corrupt archive {}: {source}", path.display())]
    CorruptArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Path traversal detected: {entry} escapes destination directory")]
    PathTraversal { entry: String },

    // Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::DeError> for PackError {
    fn from(err: quick_xml::DeError) -> Self {
        PackError::Parse(err.to_string())
    }
}

impl From<quick_xml::Error> for PackError {
    fn from(err: quick_xml::Error) -> Self {
        PackError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
