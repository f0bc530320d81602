//! Idempotent parallel download stage.
//!
//! Each row's asset lands at `<target>/fetched/<url basename>`. Assets
//! already on disk are skipped, so a run interrupted halfway can simply be
//! restarted. Rows fail individually; the batch never aborts on a bad URL
//! or a dead link.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use voxcorpus_foundation::config::FETCHED_DIR;
use voxcorpus_foundation::pool::WorkerPool;
use voxcorpus_manifest::ManifestRow;

use crate::error::FetchError;
use crate::remote::RemoteSource;

/// Outcome of the fetch stage.
#[derive(Debug)]
pub struct FetchReport {
    /// Directory holding the fetched assets.
    pub fetched_dir: PathBuf,
    pub downloaded: usize,
    pub skipped: usize,
    pub failures: Vec<FetchFailure>,
}

/// A row whose asset could not be materialized.
#[derive(Debug)]
pub struct FetchFailure {
    /// Index into the manifest row collection.
    pub row: usize,
    pub url: String,
    pub error: FetchError,
}

enum Outcome {
    Downloaded,
    Skipped,
}

/// Parallel downloader over any [`RemoteSource`].
pub struct Fetcher<S> {
    source: Arc<S>,
    pool: WorkerPool,
}

impl<S: RemoteSource + 'static> Fetcher<S> {
    pub fn new(source: S, workers: usize) -> Self {
        Self {
            source: Arc::new(source),
            pool: WorkerPool::new(workers),
        }
    }

    /// Materialize every row's asset under `target_dir/fetched`.
    ///
    /// Returns `Err` only for setup failures (directories that cannot be
    /// created); per-row failures are collected in the report.
    pub async fn fetch(
        &self,
        rows: &[ManifestRow],
        target_dir: &Path,
    ) -> Result<FetchReport, FetchError> {
        let fetched_dir = target_dir.join(FETCHED_DIR);
        std::fs::create_dir_all(&fetched_dir).map_err(|source| FetchError::Setup {
            path: fetched_dir.display().to_string(),
            source,
        })?;

        let mut failures = Vec::new();
        let mut jobs: Vec<(usize, String, PathBuf)> = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match row.asset_basename() {
                Some(base) => jobs.push((index, row.audio_url.clone(), fetched_dir.join(base))),
                None => failures.push(FetchFailure {
                    row: index,
                    url: row.audio_url.clone(),
                    error: FetchError::InvalidUrl {
                        url: row.audio_url.clone(),
                    },
                }),
            }
        }

        let meta: Vec<(usize, String)> = jobs.iter().map(|(i, url, _)| (*i, url.clone())).collect();
        let source = Arc::clone(&self.source);
        let results = self
            .pool
            .run(jobs, move |(_, url, dest): (usize, String, PathBuf)| {
                let source = Arc::clone(&source);
                async move { fetch_one(source.as_ref(), &url, &dest).await }
            })
            .await;

        let mut downloaded = 0;
        let mut skipped = 0;
        for ((index, url), result) in meta.into_iter().zip(results) {
            match result {
                Ok(Outcome::Downloaded) => downloaded += 1,
                Ok(Outcome::Skipped) => skipped += 1,
                Err(error) => {
                    tracing::warn!(row = index, url = %url, %error, "Fetch failed; row excluded downstream");
                    failures.push(FetchFailure { row: index, url, error });
                }
            }
        }

        tracing::info!(
            downloaded,
            skipped,
            failed = failures.len(),
            dir = %fetched_dir.display(),
            "Fetch stage complete"
        );
        Ok(FetchReport {
            fetched_dir,
            downloaded,
            skipped,
            failures,
        })
    }
}

async fn fetch_one<S: RemoteSource + ?Sized>(
    source: &S,
    url: &str,
    dest: &Path,
) -> Result<Outcome, FetchError> {
    if dest.exists() {
        tracing::debug!(url, dest = %dest.display(), "Asset already fetched");
        return Ok(Outcome::Skipped);
    }

    // Retrieve into a sibling temp file, then rename: a crashed or failed
    // download never leaves a half-written asset the skip check would trust
    // on the next run.
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| FetchError::Io {
        path: dest.display().to_string(),
        source: e,
    })?;
    source.retrieve(url, temp.path()).await?;
    temp.persist(dest).map_err(|e| FetchError::Io {
        path: dest.display().to_string(),
        source: e.error,
    })?;

    tracing::debug!(url, dest = %dest.display(), "Downloaded audio asset");
    Ok(Outcome::Downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSource {
        calls: AtomicUsize,
        fail_marker: Option<&'static str>,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_marker: None,
            }
        }

        fn failing_on(marker: &'static str) -> Self {
            Self {
                fail_marker: Some(marker),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl RemoteSource for MockSource {
        async fn retrieve(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(marker) = self.fail_marker {
                if url.contains(marker) {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: 404,
                    });
                }
            }
            std::fs::write(dest, b"audio-bytes").map_err(|source| FetchError::Io {
                path: dest.display().to_string(),
                source,
            })
        }
    }

    fn row(url: &str) -> ManifestRow {
        ManifestRow {
            audio_url: url.to_string(),
            transcript: "kuch shabd".to_string(),
            audio_length: 1.0,
        }
    }

    #[tokio::test]
    async fn downloads_every_row_once() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(MockSource::new(), 4);
        let rows = vec![
            row("http://cdn.example.org/a.mp3"),
            row("http://cdn.example.org/b.mp3"),
            row("http://cdn.example.org/c.mp3"),
        ];

        let report = fetcher.fetch(&rows, dir.path()).await.unwrap();
        assert_eq!(report.downloaded, 3);
        assert_eq!(report.skipped, 0);
        assert!(report.failures.is_empty());
        for name in ["a.mp3", "b.mp3", "c.mp3"] {
            assert!(report.fetched_dir.join(name).is_file());
        }
    }

    #[tokio::test]
    async fn second_run_performs_zero_retrievals() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            row("http://cdn.example.org/a.mp3"),
            row("http://cdn.example.org/b.mp3"),
        ];

        let fetcher = Fetcher::new(MockSource::new(), 2);
        fetcher.fetch(&rows, dir.path()).await.unwrap();
        assert_eq!(fetcher.source.calls.load(Ordering::SeqCst), 2);

        let report = fetcher.fetch(&rows, dir.path()).await.unwrap();
        assert_eq!(report.downloaded, 0);
        assert_eq!(report.skipped, 2);
        assert_eq!(fetcher.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn one_dead_link_does_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(MockSource::failing_on("gone"), 2);
        let rows = vec![
            row("http://cdn.example.org/a.mp3"),
            row("http://cdn.example.org/gone.mp3"),
            row("http://cdn.example.org/c.mp3"),
        ];

        let report = fetcher.fetch(&rows, dir.path()).await.unwrap();
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].row, 1);
        assert!(matches!(
            report.failures[0].error,
            FetchError::Status { status: 404, .. }
        ));
        assert!(report.fetched_dir.join("a.mp3").is_file());
        assert!(!report.fetched_dir.join("gone.mp3").exists());
        assert!(report.fetched_dir.join("c.mp3").is_file());
    }

    #[tokio::test]
    async fn url_without_basename_fails_without_a_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(MockSource::new(), 2);
        let rows = vec![row("http://cdn.example.org/corpus/")];

        let report = fetcher.fetch(&rows, dir.path()).await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            FetchError::InvalidUrl { .. }
        ));
        assert_eq!(fetcher.source.calls.load(Ordering::SeqCst), 0);
    }
}
