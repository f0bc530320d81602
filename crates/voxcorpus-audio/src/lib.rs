pub mod decoder;
pub mod error;
pub mod probe;
pub mod resampler;
pub mod transcoder;

pub use decoder::{decode_to_mono, DecodedAudio};
pub use error::{ProbeError, TranscodeError};
pub use probe::{DurationProbe, PcmProbe};
pub use resampler::PcmResampler;
pub use transcoder::{TranscodeFailure, TranscodeReport, Transcoder};
