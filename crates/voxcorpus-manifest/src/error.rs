use thiserror::Error;

/// Manifest I/O failures. Read and parse errors abort the run before any
/// work starts; write errors abort it after computation, leaving the fetched
/// and canonical assets in place for the next attempt.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed manifest row in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write manifest {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to flush manifest {path}: {source}")]
    Flush {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
