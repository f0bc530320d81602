//! Dataset assembly: validate, shuffle, split.

use std::path::Path;
use std::sync::Arc;

use voxcorpus_audio::probe::{DurationProbe, PcmProbe};
use voxcorpus_foundation::config::{PipelineConfig, SplitFractions, ValidationLimits, CANONICAL_DIR};
use voxcorpus_manifest::{ManifestRow, SampleRecord};

use crate::normalize::{LabelNormalizer, TextNormalizer};
use crate::split::{partition, shuffle};
use crate::validate::{check_validity, ExclusionCounts};

/// The three output partitions plus the exclusion tally.
#[derive(Debug)]
pub struct DatasetSplits {
    pub train: Vec<SampleRecord>,
    pub dev: Vec<SampleRecord>,
    pub test: Vec<SampleRecord>,
    pub exclusions: ExclusionCounts,
}

impl DatasetSplits {
    pub fn valid_len(&self) -> usize {
        self.train.len() + self.dev.len() + self.test.len()
    }
}

/// Builds the train/dev/test partitions from the manifest and the
/// materialized canonical assets.
///
/// The duration probe and transcript normalizer are seams: production uses
/// the PCM probe and the default label cleaner, tests inject their own.
pub struct DatasetBuilder {
    probe: Arc<dyn DurationProbe>,
    normalizer: Arc<dyn TextNormalizer>,
    limits: ValidationLimits,
    fractions: SplitFractions,
    seed: Option<u64>,
}

impl DatasetBuilder {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            probe: Arc::new(PcmProbe::new(config.audio)),
            normalizer: Arc::new(LabelNormalizer::new()),
            limits: config.limits,
            fractions: config.split,
            seed: config.seed,
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn DurationProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn TextNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Validate every row, shuffle the survivors, and slice the partitions.
    ///
    /// Rows never fail this stage loudly: a missing or unprobeable asset
    /// and a failed predicate all land in the exclusion tally while the
    /// build continues.
    pub fn build(&self, rows: &[ManifestRow], target_dir: &Path) -> DatasetSplits {
        let mut exclusions = ExclusionCounts::default();
        let mut valid: Vec<SampleRecord> = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let Some(canonical_name) = row.canonical_filename() else {
                exclusions.missing_asset += 1;
                continue;
            };
            let absolute = target_dir.join(CANONICAL_DIR).join(&canonical_name);
            let pcm_filesize = match std::fs::metadata(&absolute) {
                Ok(meta) => meta.len(),
                Err(_) => {
                    tracing::debug!(row = index, path = %absolute.display(), "Canonical asset absent; row excluded");
                    exclusions.missing_asset += 1;
                    continue;
                }
            };

            // "No valid label" from the normalizer reads as an empty
            // transcript, which the predicate rejects below.
            let transcript = self
                .normalizer
                .normalize(&row.transcript)
                .unwrap_or_default();

            let duration_ms = match self.probe.duration_ms(&absolute) {
                Ok(duration) => duration,
                Err(error) => {
                    tracing::debug!(row = index, %error, "Duration probe failed; row excluded");
                    exclusions.probe_failed += 1;
                    continue;
                }
            };

            match check_validity(&self.limits, duration_ms, &transcript) {
                Ok(()) => valid.push(SampleRecord {
                    pcm_filename: format!("{CANONICAL_DIR}/{canonical_name}"),
                    pcm_filesize,
                    transcript,
                }),
                Err(reason) => {
                    tracing::debug!(row = index, ?reason, duration_ms, "Row failed validation");
                    exclusions.record(reason);
                }
            }
        }

        shuffle(&mut valid, self.seed);
        let total = valid.len();
        let (train, dev, test) = partition(valid, self.fractions);

        tracing::info!(
            valid = total,
            excluded = exclusions.total(),
            train = train.len(),
            dev = dev.len(),
            test = test.len(),
            "Dataset split complete"
        );
        DatasetSplits {
            train,
            dev,
            test,
            exclusions,
        }
    }
}
