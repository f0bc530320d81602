use std::path::Path;

use serde::Deserialize;

use voxcorpus_foundation::config::CANONICAL_EXT;

/// One row of the source corpus manifest.
///
/// Immutable once loaded; the pipeline derives local asset names from the
/// URL deterministically, so concurrent stages never contend for a filename.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestRow {
    /// Remote audio location.
    pub audio_url: String,
    /// Raw transcript as shipped by the corpus.
    pub transcript: String,
    /// Duration in seconds as declared by the manifest. Informational only:
    /// validation probes the materialized audio instead, since declared
    /// durations are known to drift from the actual files.
    pub audio_length: f64,
}

impl ManifestRow {
    /// Local filename for the fetched asset: the final path segment of the
    /// URL with any query or fragment stripped. `None` when the URL carries
    /// no usable basename (e.g. ends in a slash).
    pub fn asset_basename(&self) -> Option<&str> {
        let without_suffix = self
            .audio_url
            .split(['?', '#'])
            .next()
            .unwrap_or(self.audio_url.as_str());
        let base = without_suffix.rsplit('/').next().unwrap_or("");
        if base.is_empty() {
            None
        } else {
            Some(base)
        }
    }

    /// Filename of the canonical PCM asset derived from this row.
    pub fn canonical_filename(&self) -> Option<String> {
        let base = self.asset_basename()?;
        let stem = Path::new(base).file_stem()?.to_str()?;
        Some(format!("{stem}.{CANONICAL_EXT}"))
    }
}

/// A validated sample ready for a split manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    /// Canonical asset path relative to the target directory.
    pub pcm_filename: String,
    /// Size of the canonical asset in bytes.
    pub pcm_filesize: u64,
    /// Normalized transcript.
    pub transcript: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(url: &str) -> ManifestRow {
        ManifestRow {
            audio_url: url.to_string(),
            transcript: String::new(),
            audio_length: 0.0,
        }
    }

    #[test]
    fn basename_is_final_path_segment() {
        assert_eq!(
            row("http://cdn.example.org/corpus/clip_001.mp3").asset_basename(),
            Some("clip_001.mp3")
        );
    }

    #[test]
    fn basename_strips_query_and_fragment() {
        assert_eq!(
            row("http://cdn.example.org/a/b.mp3?token=xyz#t=10").asset_basename(),
            Some("b.mp3")
        );
    }

    #[test]
    fn url_ending_in_slash_has_no_basename() {
        assert_eq!(row("http://cdn.example.org/corpus/").asset_basename(), None);
        assert_eq!(row("http://cdn.example.org/corpus/").canonical_filename(), None);
    }

    #[test]
    fn canonical_filename_swaps_extension() {
        assert_eq!(
            row("http://cdn.example.org/clip_001.mp3").canonical_filename(),
            Some("clip_001.pcm".to_string())
        );
        // Extensionless basenames still get the canonical extension.
        assert_eq!(
            row("http://cdn.example.org/clip_002").canonical_filename(),
            Some("clip_002.pcm".to_string())
        );
    }
}
