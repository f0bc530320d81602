//! Mono batch resampling using Rubato's sinc interpolation.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::TranscodeError;

/// Batch resampler for whole mono clips.
///
/// Rubato wants fixed-size input chunks; the tail of a clip is zero-padded
/// up to the chunk boundary and the output is trimmed back to the expected
/// length, so the resampled clip keeps the source duration.
pub struct PcmResampler {
    in_rate: u32,
    out_rate: u32,
    resampler: SincFixedIn<f32>,
    chunk_size: usize,
}

impl PcmResampler {
    pub fn new(in_rate: u32, out_rate: u32) -> Result<Self, TranscodeError> {
        // Batch conversion has no latency budget; favor quality suitable
        // for speech.
        let chunk_size = 1024;
        let sinc_params = SincInterpolationParameters {
            sinc_len: 64,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Cubic,
            oversampling_factor: 128,
            window: WindowFunction::Blackman2,
        };
        let resampler = SincFixedIn::<f32>::new(
            out_rate as f64 / in_rate as f64,
            2.0,
            sinc_params,
            chunk_size,
            1, // mono
        )
        .map_err(|e| TranscodeError::Resample(e.to_string()))?;

        Ok(Self {
            in_rate,
            out_rate,
            resampler,
            chunk_size,
        })
    }

    /// Resample a whole clip from the input rate to the output rate.
    pub fn convert(&mut self, input: &[f32]) -> Result<Vec<f32>, TranscodeError> {
        if self.in_rate == self.out_rate {
            return Ok(input.to_vec());
        }

        let ratio = self.out_rate as f64 / self.in_rate as f64;
        let expected = (input.len() as f64 * ratio).round() as usize;
        let mut output = Vec::with_capacity(expected + self.chunk_size);

        for block in input.chunks(self.chunk_size) {
            let chunk = if block.len() == self.chunk_size {
                block.to_vec()
            } else {
                let mut tail = block.to_vec();
                tail.resize(self.chunk_size, 0.0);
                tail
            };
            let input_frames = vec![chunk];
            let output_frames = self
                .resampler
                .process(&input_frames, None)
                .map_err(|e| TranscodeError::Resample(e.to_string()))?;
            if let Some(channel) = output_frames.first() {
                output.extend_from_slice(channel);
            }
        }

        output.truncate(expected);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_same_rate() {
        let mut rs = PcmResampler::new(16_000, 16_000).unwrap();
        let input = vec![0.1f32, 0.2, 0.3, 0.4];
        assert_eq!(rs.convert(&input).unwrap(), input);
    }

    #[test]
    fn downsample_keeps_the_source_duration() {
        let mut rs = PcmResampler::new(48_000, 16_000).unwrap();
        let input: Vec<f32> = (0..48_000).map(|i| ((i % 100) as f32 - 50.0) / 64.0).collect();
        let output = rs.convert(&input).unwrap();
        // One second in, one second out at the new rate.
        assert_eq!(output.len(), 16_000);
    }

    #[test]
    fn upsample_of_short_clip() {
        let mut rs = PcmResampler::new(8_000, 16_000).unwrap();
        let input = vec![0.25f32; 800]; // 100 ms
        let output = rs.convert(&input).unwrap();
        assert_eq!(output.len(), 1_600);
        assert!(output.iter().all(|s| s.abs() <= 1.0));
    }
}
