//! Compressed-audio decoding.
//!
//! Symphonia handles whatever codec the corpus ships (MP3 in practice, but
//! nothing here assumes it); multi-channel input is averaged down to mono.

use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::TranscodeError;

/// A fully decoded clip, mono, at its native rate.
#[derive(Debug)]
pub struct DecodedAudio {
    /// Samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Decode an audio file to mono f32 samples at the source rate.
pub fn decode_to_mono(path: &Path) -> Result<DecodedAudio, TranscodeError> {
    let decode_err = |source| TranscodeError::Decode {
        path: path.display().to_string(),
        source,
    };

    let file = std::fs::File::open(path).map_err(|source| TranscodeError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(decode_err)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| TranscodeError::Unsupported {
            path: path.display().to_string(),
            reason: "no audio track".to_string(),
        })?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| TranscodeError::Unsupported {
            path: path.display().to_string(),
            reason: "sample rate unknown".to_string(),
        })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(decode_err)?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(source) => return Err(decode_err(source)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map_err(decode_err)?;
        if sample_buf.is_none() {
            let spec = *decoded.spec();
            sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        }
        let channels = decoded.spec().channels.count();
        if let Some(buf) = &mut sample_buf {
            buf.copy_interleaved_ref(decoded);
            if channels <= 1 {
                samples.extend_from_slice(buf.samples());
            } else {
                for frame in buf.samples().chunks_exact(channels) {
                    samples.push(frame.iter().sum::<f32>() / channels as f32);
                }
            }
        }
    }

    tracing::debug!(
        path = %path.display(),
        sample_rate,
        samples = samples.len(),
        "Decoded audio asset"
    );
    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_open_error() {
        let err = decode_to_mono(Path::new("/no/such/clip.mp3")).unwrap_err();
        assert!(matches!(err, TranscodeError::Open { .. }));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not an mp3 stream").unwrap();
        assert!(decode_to_mono(&path).is_err());
    }

    #[test]
    fn decodes_a_wav_clip_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..8_000 {
            let s = ((i % 100) as i16 - 50) * 100;
            writer.write_sample(s).unwrap(); // left
            writer.write_sample(s).unwrap(); // right
        }
        writer.finalize().unwrap();

        let decoded = decode_to_mono(&path).unwrap();
        assert_eq!(decoded.sample_rate, 8_000);
        // Stereo frames collapse to one mono sample each.
        assert_eq!(decoded.samples.len(), 8_000);
        assert!(decoded.samples.iter().all(|s| s.abs() <= 1.0));
    }
}
