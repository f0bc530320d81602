use thiserror::Error;

/// Transcode-stage failures.
///
/// `Setup` is fatal; every other variant is file-local, recorded against
/// its row while the batch continues.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported or corrupt audio in {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: symphonia::core::errors::Error,
    },

    #[error("Cannot decode {path}: {reason}")]
    Unsupported { path: String, reason: String },

    #[error("Resampler failure: {0}")]
    Resample(String),

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

    #[error("Transcode task failed: {0}")]
    Join(String),
}

/// Duration probe failures. A row whose canonical asset cannot be probed is
/// excluded from the dataset, never fatal.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to stat {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Torn frame in {path}: {len} bytes is not a whole number of frames")]
    TornFrame { path: String, len: u64 },
}
