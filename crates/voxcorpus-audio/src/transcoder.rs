//! Canonical-format conversion stage.
//!
//! Every fetched asset becomes `<target>/canonical/<stem>.pcm`: raw
//! interleaved little-endian s16, mono, at the configured rate. Conversion
//! is idempotent (existing canonical files are skipped) and per-file
//! failures never abort the batch.

use std::io::Write;
use std::path::{Path, PathBuf};

use voxcorpus_foundation::config::{AudioFormatConfig, CANONICAL_DIR};
use voxcorpus_foundation::pool::WorkerPool;
use voxcorpus_manifest::ManifestRow;

use crate::decoder::decode_to_mono;
use crate::error::TranscodeError;
use crate::resampler::PcmResampler;

/// Outcome of the transcode stage.
#[derive(Debug)]
pub struct TranscodeReport {
    /// Directory holding canonical assets.
    pub canonical_dir: PathBuf,
    pub converted: usize,
    pub skipped: usize,
    /// Rows whose fetched asset never materialized (their fetch failed);
    /// they are excluded downstream rather than treated as errors here.
    pub missing: usize,
    pub failures: Vec<TranscodeFailure>,
}

/// An asset that could not be converted.
#[derive(Debug)]
pub struct TranscodeFailure {
    /// Index into the manifest row collection.
    pub row: usize,
    pub path: PathBuf,
    pub error: TranscodeError,
}

/// Parallel transcoder over the manifest rows.
///
/// Enumeration is manifest-driven rather than a directory scan: every
/// canonical asset traces back to a known source row, and stale files left
/// in the fetched directory by earlier runs are simply ignored.
pub struct Transcoder {
    format: AudioFormatConfig,
    pool: WorkerPool,
}

impl Transcoder {
    pub fn new(format: AudioFormatConfig, workers: usize) -> Self {
        Self {
            format,
            pool: WorkerPool::new(workers),
        }
    }

    /// Convert every row's fetched asset under `target_dir/canonical`.
    ///
    /// Returns `Err` only for setup failures; per-file failures are
    /// collected in the report.
    pub async fn transcode(
        &self,
        rows: &[ManifestRow],
        fetched_dir: &Path,
        target_dir: &Path,
    ) -> Result<TranscodeReport, TranscodeError> {
        let canonical_dir = target_dir.join(CANONICAL_DIR);
        std::fs::create_dir_all(&canonical_dir).map_err(|source| TranscodeError::Setup {
            path: canonical_dir.display().to_string(),
            source,
        })?;

        let mut missing = 0;
        let mut skipped = 0;
        let mut jobs: Vec<(usize, PathBuf, PathBuf)> = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let (Some(base), Some(canonical_name)) =
                (row.asset_basename(), row.canonical_filename())
            else {
                missing += 1;
                continue;
            };
            let src = fetched_dir.join(base);
            if !src.exists() {
                tracing::debug!(row = index, src = %src.display(), "Fetched asset absent; skipping");
                missing += 1;
                continue;
            }
            let dst = canonical_dir.join(canonical_name);
            if dst.exists() {
                tracing::debug!(row = index, dst = %dst.display(), "Already transcoded");
                skipped += 1;
                continue;
            }
            jobs.push((index, src, dst));
        }

        let meta: Vec<(usize, PathBuf)> =
            jobs.iter().map(|(i, src, _)| (*i, src.clone())).collect();
        let format = self.format;
        let results = self
            .pool
            .run(jobs, move |(_, src, dst): (usize, PathBuf, PathBuf)| {
                async move {
                    match tokio::task::spawn_blocking(move || convert_file(&src, &dst, format))
                        .await
                    {
                        Ok(result) => result,
                        Err(e) => Err(TranscodeError::Join(e.to_string())),
                    }
                }
            })
            .await;

        let mut converted = 0;
        let mut failures = Vec::new();
        for ((index, src), result) in meta.into_iter().zip(results) {
            match result {
                Ok(()) => converted += 1,
                Err(error) => {
                    tracing::warn!(row = index, src = %src.display(), %error, "Transcode failed; row excluded downstream");
                    failures.push(TranscodeFailure {
                        row: index,
                        path: src,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            converted,
            skipped,
            missing,
            failed = failures.len(),
            dir = %canonical_dir.display(),
            "Transcode stage complete"
        );
        Ok(TranscodeReport {
            canonical_dir,
            converted,
            skipped,
            missing,
            failures,
        })
    }
}

/// Decode, resample, quantize, and atomically place one asset.
fn convert_file(src: &Path, dst: &Path, format: AudioFormatConfig) -> Result<(), TranscodeError> {
    let decoded = decode_to_mono(src)?;
    let mut resampler = PcmResampler::new(decoded.sample_rate, format.sample_rate_hz)?;
    let samples = resampler.convert(&decoded.samples)?;

    let io_err = |source| TranscodeError::Io {
        path: dst.display().to_string(),
        source,
    };
    let dir = dst.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file_mut());
        for &sample in &samples {
            let quantized = (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16;
            writer.write_all(&quantized.to_le_bytes()).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;
    }
    temp.persist(dst).map_err(|e| io_err(e.error))?;

    tracing::debug!(src = %src.display(), dst = %dst.display(), "Transcoded audio asset");
    Ok(())
}
