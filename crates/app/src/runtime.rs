//! Sequential pipeline orchestration.
//!
//! Stages run strictly one after another: load, fetch, transcode, build,
//! write. Each stage fans out internally where it can; the runner itself
//! only sequences them and aggregates the summary.

use std::fmt;
use std::path::Path;

use anyhow::Context;

use voxcorpus_audio::Transcoder;
use voxcorpus_dataset::{DatasetBuilder, ExclusionCounts};
use voxcorpus_fetch::{Fetcher, HttpSource, RemoteSource};
use voxcorpus_foundation::config::PipelineConfig;
use voxcorpus_manifest::{read_manifest, write_splits};

/// What one import run did, stage by stage.
#[derive(Debug)]
pub struct ImportSummary {
    pub rows: usize,
    pub downloaded: usize,
    pub fetch_skipped: usize,
    pub fetch_failed: usize,
    pub converted: usize,
    pub transcode_skipped: usize,
    pub transcode_missing: usize,
    pub transcode_failed: usize,
    pub valid: usize,
    pub excluded: ExclusionCounts,
    pub train: usize,
    pub dev: usize,
    pub test: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rows loaded:  {}", self.rows)?;
        writeln!(
            f,
            "fetched:      {} new, {} reused, {} failed",
            self.downloaded, self.fetch_skipped, self.fetch_failed
        )?;
        writeln!(
            f,
            "transcoded:   {} new, {} reused, {} missing, {} failed",
            self.converted, self.transcode_skipped, self.transcode_missing, self.transcode_failed
        )?;
        writeln!(
            f,
            "valid:        {} samples ({} excluded)",
            self.valid,
            self.excluded.total()
        )?;
        write!(
            f,
            "partitions:   {} train / {} dev / {} test",
            self.train, self.dev, self.test
        )
    }
}

/// The whole import, wired for one retrieval backend.
pub struct ImportPipeline<S> {
    config: PipelineConfig,
    source: S,
}

impl ImportPipeline<HttpSource> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_source(config, HttpSource::new())
    }
}

impl<S: RemoteSource + 'static> ImportPipeline<S> {
    pub fn with_source(config: PipelineConfig, source: S) -> Self {
        Self { config, source }
    }

    /// Run every stage. Setup and manifest errors are fatal; per-row
    /// trouble is absorbed by the stages and surfaces in the summary.
    pub async fn run(
        self,
        manifest_path: &Path,
        target_dir: &Path,
    ) -> anyhow::Result<ImportSummary> {
        self.config
            .validate()
            .context("invalid pipeline configuration")?;
        std::fs::create_dir_all(target_dir).with_context(|| {
            format!("creating target directory {}", target_dir.display())
        })?;

        tracing::info!(
            manifest = %manifest_path.display(),
            target = %target_dir.display(),
            "Starting corpus import"
        );
        let rows = read_manifest(manifest_path).context("loading source manifest")?;

        let workers = self.config.effective_workers();
        let fetcher = Fetcher::new(self.source, workers);
        let fetch = fetcher
            .fetch(&rows, target_dir)
            .await
            .context("fetch stage setup")?;

        let transcoder = Transcoder::new(self.config.audio, workers);
        let transcode = transcoder
            .transcode(&rows, &fetch.fetched_dir, target_dir)
            .await
            .context("transcode stage setup")?;

        let splits = DatasetBuilder::new(&self.config).build(&rows, target_dir);
        write_splits(target_dir, &splits.train, &splits.dev, &splits.test)
            .context("writing split manifests")?;

        let summary = ImportSummary {
            rows: rows.len(),
            downloaded: fetch.downloaded,
            fetch_skipped: fetch.skipped,
            fetch_failed: fetch.failures.len(),
            converted: transcode.converted,
            transcode_skipped: transcode.skipped,
            transcode_missing: transcode.missing,
            transcode_failed: transcode.failures.len(),
            valid: splits.valid_len(),
            excluded: splits.exclusions,
            train: splits.train.len(),
            dev: splits.dev.len(),
            test: splits.test.len(),
        };
        tracing::info!(
            valid = summary.valid,
            train = summary.train,
            dev = summary.dev,
            test = summary.test,
            "Corpus import finished"
        );
        Ok(summary)
    }
}
