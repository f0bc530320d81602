//! Source manifest loading.
//!
//! The corpus ships a UTF-8 CSV with a header row and quoted fields;
//! transcripts may embed delimiters and newlines. Only the columns the
//! pipeline consumes are kept, selected by header name so the provider can
//! reorder or append columns without breaking the import.

use std::path::Path;

use crate::error::ManifestError;
use crate::types::ManifestRow;

/// Read the source corpus manifest, preserving row order.
///
/// Any unreadable file or row with a mismatched column count is fatal:
/// a manifest that cannot be trusted end to end is not worth a partial run.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRow>, ManifestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)
        .map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;

    let mut rows = Vec::new();
    for record in reader.deserialize::<ManifestRow>() {
        let row = record.map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        rows.push(row);
    }

    tracing::info!(rows = rows.len(), path = %path.display(), "Parsed source manifest");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn keeps_consumed_columns_and_drops_the_rest() {
        let file = write_manifest(
            "piece_id,audio_url,transcript,audio_length,user_id\n\
             17,http://cdn.example.org/a.mp3,namaste,3.5,204\n\
             18,http://cdn.example.org/b.mp3,shubh prabhat,2.25,817\n",
        );
        let rows = read_manifest(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].audio_url, "http://cdn.example.org/a.mp3");
        assert_eq!(rows[0].transcript, "namaste");
        assert_eq!(rows[0].audio_length, 3.5);
        assert_eq!(rows[1].transcript, "shubh prabhat");
    }

    #[test]
    fn tolerates_embedded_delimiters_and_newlines_in_quotes() {
        let file = write_manifest(
            "audio_url,transcript,audio_length\n\
             http://cdn.example.org/a.mp3,\"one, two\",1.0\n\
             http://cdn.example.org/b.mp3,\"first line\nsecond line\",2.0\n",
        );
        let rows = read_manifest(file.path()).unwrap();
        assert_eq!(rows[0].transcript, "one, two");
        assert_eq!(rows[1].transcript, "first line\nsecond line");
    }

    #[test]
    fn preserves_source_order() {
        let file = write_manifest(
            "audio_url,transcript,audio_length\n\
             http://cdn.example.org/z.mp3,last alphabetically,1.0\n\
             http://cdn.example.org/a.mp3,first alphabetically,1.0\n",
        );
        let rows = read_manifest(file.path()).unwrap();
        assert_eq!(rows[0].transcript, "last alphabetically");
        assert_eq!(rows[1].transcript, "first alphabetically");
    }

    #[test]
    fn column_count_mismatch_is_fatal() {
        let file = write_manifest(
            "audio_url,transcript,audio_length\n\
             http://cdn.example.org/a.mp3,fine,1.0\n\
             http://cdn.example.org/b.mp3,missing duration\n",
        );
        let err = read_manifest(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn unparseable_duration_is_fatal() {
        let file = write_manifest(
            "audio_url,transcript,audio_length\n\
             http://cdn.example.org/a.mp3,fine,not-a-number\n",
        );
        assert!(read_manifest(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = read_manifest(Path::new("/no/such/manifest.csv")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }
}
