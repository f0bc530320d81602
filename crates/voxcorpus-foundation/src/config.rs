//! Pipeline configuration.
//!
//! Every tuning constant the importer honors is a named field here. The
//! config value is threaded explicitly through each stage entry point; no
//! stage reads ambient global state. A TOML file can override any subset of
//! fields, and the CLI layers its own overrides on top of that.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Subdirectory of the target holding assets in their original codec.
pub const FETCHED_DIR: &str = "fetched";
/// Subdirectory of the target holding canonical PCM assets.
pub const CANONICAL_DIR: &str = "canonical";
/// Extension of canonical assets (raw interleaved little-endian s16).
pub const CANONICAL_EXT: &str = "pcm";

/// Canonical audio format the transcoder produces.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioFormatConfig {
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl Default for AudioFormatConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 16_000,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

impl AudioFormatConfig {
    /// Bytes per PCM frame (all channels of one sample instant).
    pub fn frame_bytes(&self) -> u64 {
        (self.bits_per_sample as u64 / 8) * self.channels as u64
    }
}

/// Acoustic/textual limits a sample must satisfy to enter a split.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationLimits {
    /// Hard ceiling on clip length in seconds.
    pub max_clip_secs: u32,
    /// Minimum milliseconds of audio required per transcript character.
    /// A clip shorter than `chars * min_ms_per_char` cannot plausibly
    /// contain its transcript at a human speaking rate.
    pub min_ms_per_char: u64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_clip_secs: 10,
            min_ms_per_char: 20,
        }
    }
}

/// Split proportions. The test partition absorbs whatever the train and dev
/// floors leave behind.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitFractions {
    pub train: f64,
    pub dev: f64,
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            train: 0.80,
            dev: 0.10,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub audio: AudioFormatConfig,
    pub limits: ValidationLimits,
    pub split: SplitFractions,
    /// Worker count for the fetch and transcode stages. Unset means one per
    /// available core.
    pub workers: Option<usize>,
    /// Shuffle seed. Unset draws fresh entropy, so every run produces a
    /// fresh split.
    pub seed: Option<u64>,
}

impl PipelineConfig {
    /// Load overrides from a TOML file on top of the defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.sample_rate_hz == 0 {
            return Err(ConfigError::Validation {
                field: "audio.sample_rate_hz".into(),
                reason: "must be positive".into(),
            });
        }
        // The canonical encoder only emits mono s16.
        if self.audio.channels != 1 {
            return Err(ConfigError::Validation {
                field: "audio.channels".into(),
                reason: "only mono output is supported".into(),
            });
        }
        if self.audio.bits_per_sample != 16 {
            return Err(ConfigError::Validation {
                field: "audio.bits_per_sample".into(),
                reason: "only 16-bit output is supported".into(),
            });
        }
        if self.limits.min_ms_per_char == 0 {
            return Err(ConfigError::Validation {
                field: "limits.min_ms_per_char".into(),
                reason: "must be positive".into(),
            });
        }
        for (field, value) in [("split.train", self.split.train), ("split.dev", self.split.dev)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must be within [0, 1]".into(),
                });
            }
        }
        if self.split.train + self.split.dev > 1.0 {
            return Err(ConfigError::Validation {
                field: "split".into(),
                reason: "train and dev fractions must not exceed 1.0 combined".into(),
            });
        }
        Ok(())
    }

    /// Worker count after resolving the auto default.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_legacy_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.audio.sample_rate_hz, 16_000);
        assert_eq!(config.audio.channels, 1);
        assert_eq!(config.audio.bits_per_sample, 16);
        assert_eq!(config.limits.max_clip_secs, 10);
        assert_eq!(config.limits.min_ms_per_char, 20);
        assert_eq!(config.split.train, 0.80);
        assert_eq!(config.split.dev, 0.10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_subset_of_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "seed = 42\n\n[limits]\nmax_clip_secs = 15\n"
        )
        .unwrap();
        let config = PipelineConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.limits.max_clip_secs, 15);
        // Untouched sections keep their defaults.
        assert_eq!(config.limits.min_ms_per_char, 20);
        assert_eq!(config.audio.sample_rate_hz, 16_000);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = PipelineConfig::from_toml_file(Path::new("/no/such/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn rejects_unsupported_output_format() {
        let config = PipelineConfig {
            audio: AudioFormatConfig {
                channels: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("audio.channels"));
    }

    #[test]
    fn rejects_oversubscribed_fractions() {
        let config = PipelineConfig {
            split: SplitFractions {
                train: 0.95,
                dev: 0.10,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn effective_workers_prefers_explicit_count() {
        let config = PipelineConfig {
            workers: Some(3),
            ..Default::default()
        };
        assert_eq!(config.effective_workers(), 3);
        assert!(PipelineConfig::default().effective_workers() >= 1);
    }
}
