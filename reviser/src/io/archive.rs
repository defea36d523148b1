//! Round archiving: compress a completed round directory and remove it.
//!
//! Archiving freezes history and frees the disk space a full per-round
//! snapshot costs. The source tree is deleted only after the archive has
//! been written successfully, so a failed compression never loses data.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{info, warn};

/// Suffix appended to the source directory name.
pub const ARCHIVE_SUFFIX: &str = "_archive.tar.gz";

/// Result of an archive request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Tree compressed to the given artifact and source removed.
    Archived(PathBuf),
    /// Source directory did not exist; nothing to do. Idempotent re-runs
    /// land here after the first success.
    SkippedMissing,
}

/// Path of the archive artifact for `source_dir`.
pub fn archive_path(source_dir: &Path) -> PathBuf {
    let name = source_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "round".to_string());
    source_dir.with_file_name(format!("{name}{ARCHIVE_SUFFIX}"))
}

/// Compress `source_dir` into `<source_dir>_archive.tar.gz`, then delete the
/// source tree.
///
/// A missing source is a warning, not an error: archiving runs lazily at the
/// start of every round, so directories archived by an earlier round (or a
/// previous run) are expected to be gone.
pub fn archive_round(source_dir: &Path) -> Result<ArchiveOutcome> {
    if !source_dir.exists() {
        warn!(source = %source_dir.display(), "source directory missing, skipping archive");
        return Ok(ArchiveOutcome::SkippedMissing);
    }

    let artifact = archive_path(source_dir);
    let file = fs::File::create(&artifact)
        .with_context(|| format!("create archive {}", artifact.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder
        .append_dir_all(".", source_dir)
        .with_context(|| format!("archive {}", source_dir.display()))?;
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .with_context(|| format!("finish archive {}", artifact.display()))?;

    // Only now is the uncompressed copy expendable.
    fs::remove_dir_all(source_dir)
        .with_context(|| format!("remove archived source {}", source_dir.display()))?;
    info!(artifact = %artifact.display(), "round archived");
    Ok(ArchiveOutcome::Archived(artifact))
}
