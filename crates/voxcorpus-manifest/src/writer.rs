//! Split manifest serialization.
//!
//! Each partition becomes `<target>/<name>.csv` with the header the
//! downstream trainer expects. Existing files are overwritten: splits are
//! regenerated with a fresh shuffle on every run, so stale manifests must
//! not survive.

use std::path::{Path, PathBuf};

use crate::error::ManifestError;
use crate::types::SampleRecord;

/// Column header mandated by the downstream training pipeline.
pub const MANIFEST_HEADER: [&str; 3] = ["wav_filename", "wav_filesize", "transcript"];

/// Serialize one partition. Fields are quoted only when they need to be;
/// embedded delimiters, quotes, and newlines in transcripts survive a
/// read-back losslessly.
pub fn write_partition(
    dir: &Path,
    name: &str,
    rows: &[SampleRecord],
) -> Result<PathBuf, ManifestError> {
    let path = dir.join(format!("{name}.csv"));
    let mut writer = csv::Writer::from_path(&path).map_err(|source| ManifestError::Write {
        path: path.display().to_string(),
        source,
    })?;

    let write_err = |source| ManifestError::Write {
        path: path.display().to_string(),
        source,
    };
    writer.write_record(MANIFEST_HEADER).map_err(write_err)?;
    for row in rows {
        writer
            .write_record([
                row.pcm_filename.as_str(),
                row.pcm_filesize.to_string().as_str(),
                row.transcript.as_str(),
            ])
            .map_err(write_err)?;
    }
    writer.flush().map_err(|source| ManifestError::Flush {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(rows = rows.len(), path = %path.display(), "Wrote split manifest");
    Ok(path)
}

/// Write all three partitions. Callers only reach this once the full split
/// is computed, so a failure here never leaves a partial set behind by
/// design: the first write error aborts before later partitions, and the
/// run reports a fatal error.
pub fn write_splits(
    dir: &Path,
    train: &[SampleRecord],
    dev: &[SampleRecord],
    test: &[SampleRecord],
) -> Result<(), ManifestError> {
    for (name, rows) in [("train", train), ("dev", dev), ("test", test)] {
        write_partition(dir, name, rows)?;
    }
    Ok(())
}
