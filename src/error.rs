use crate::types::Chamber;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Never carries the request URL, which holds the API key
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Upstream API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to fetch {chamber} roster: {source}")]
    DirectoryFetch {
        chamber: Chamber,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to fetch bill {label}: {source}")]
    BillFetch {
        label: String,
        #[source]
        source: Box<Error>,
    },

    #[error("District {district} has no {chamber} legislator")]
    UnknownDistrict { chamber: Chamber, district: String },

    #[error("Invalid upstream record: {0}")]
    InvalidRecord(String),

    #[error("Spreadsheet error: {0}")]
    Sheet(String),

    #[error("Invalid range address: {0}")]
    Range(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.without_url())
    }
}

impl Error {
    /// Wrap a roster failure so callers can tell it apart from bill failures
    pub fn directory(chamber: Chamber, source: Error) -> Self {
        Error::DirectoryFetch {
            chamber,
            source: Box::new(source),
        }
    }

    /// Wrap a bill-detail failure with the label that was being fetched
    pub fn bill(label: impl Into<String>, source: Error) -> Self {
        Error::BillFetch {
            label: label.into(),
            source: Box::new(source),
        }
    }
}
