use thiserror::Error;

/// Fetch-stage failures.
///
/// Only `Setup` is fatal to a run. Everything else is row-local: it is
/// recorded against the row and the batch keeps going, leaving that row's
/// asset absent for later stages to skip.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No usable basename in audio URL {url:?}")]
    InvalidUrl { url: String },

    #[error("HTTP request failed for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    Setup {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
