//! Duration inspection of canonical assets.
//!
//! Validation needs the real clip duration, not the manifest's declared
//! one. Canonical assets are headerless PCM, so the frame count falls out
//! of the byte length.

use std::path::Path;

use voxcorpus_foundation::config::AudioFormatConfig;

use crate::error::ProbeError;

/// Reports the millisecond duration of an audio asset.
pub trait DurationProbe: Send + Sync {
    fn duration_ms(&self, path: &Path) -> Result<u64, ProbeError>;
}

/// Probe for raw interleaved s16 PCM at a fixed format.
#[derive(Debug, Clone, Copy)]
pub struct PcmProbe {
    format: AudioFormatConfig,
}

impl PcmProbe {
    pub fn new(format: AudioFormatConfig) -> Self {
        Self { format }
    }
}

impl DurationProbe for PcmProbe {
    fn duration_ms(&self, path: &Path) -> Result<u64, ProbeError> {
        let len = std::fs::metadata(path)
            .map_err(|source| ProbeError::Io {
                path: path.display().to_string(),
                source,
            })?
            .len();
        let frame_bytes = self.format.frame_bytes();
        if len % frame_bytes != 0 {
            return Err(ProbeError::TornFrame {
                path: path.display().to_string(),
                len,
            });
        }
        let frames = len / frame_bytes;
        Ok(frames * 1000 / self.format.sample_rate_hz as u64)
    }
}
