//! Temporary on-disk store for chunks of one oversized file.
//!
//! Chunks are written under a hidden sibling directory with their 1-based
//! ordinal embedded in the file name. Combination reads them back sorted
//! numerically by that ordinal, concatenates, and deletes each chunk as it
//! is consumed; the store directory is removed at the end. A file in the
//! store whose name does not parse is an error, never silently skipped.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use thiserror::Error;

/// Chunk file names: `chunk_<ordinal>.txt`.
static CHUNK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^chunk_(\d+)\.txt$").expect("chunk regex should be valid"));

/// A chunk file whose name violates the ordinal naming invariant.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed chunk name {name:?}: expected chunk_<ordinal>.txt")]
pub struct ChunkOrdinalError {
    pub name: String,
}

/// Store rooted at `.<stem>.chunks` next to the file being split.
#[derive(Debug)]
pub struct ChunkStore {
    dir: PathBuf,
}

impl ChunkStore {
    /// Create an empty store for `file_path`'s chunks.
    pub fn create_for(file_path: &Path) -> Result<Self> {
        let name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let dir = file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!(".{name}.chunks"));
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("clear stale chunk dir {}", dir.display()))?;
        }
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one chunk under its 1-based ordinal.
    pub fn write_chunk(&self, ordinal: usize, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(format!("chunk_{ordinal:04}.txt"));
        fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Read chunks back sorted numerically by embedded ordinal, concatenate
    /// in that order, and delete each chunk as it is consumed.
    ///
    /// Destructive: on success the store directory is gone. A non-chunk file
    /// in the store aborts with [`ChunkOrdinalError`]. On any error the
    /// store is removed too, so a half-consumed store never leaks into the
    /// round tree and its archive.
    pub fn combine(self) -> Result<String> {
        let combined = self.combine_inner();
        if combined.is_err() {
            let _ = fs::remove_dir_all(&self.dir);
        }
        combined
    }

    fn combine_inner(&self) -> Result<String> {
        let mut ordered: Vec<(u64, PathBuf)> = Vec::new();
        for entry in
            fs::read_dir(&self.dir).with_context(|| format!("read {}", self.dir.display()))?
        {
            let entry = entry.with_context(|| format!("read {}", self.dir.display()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let ordinal = CHUNK_NAME
                .captures(&name)
                .and_then(|caps| caps[1].parse::<u64>().ok())
                .ok_or(ChunkOrdinalError { name })?;
            ordered.push((ordinal, entry.path()));
        }
        ordered.sort_by_key(|(ordinal, _)| *ordinal);

        let mut combined = String::new();
        for (_, path) in ordered {
            let content =
                fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            combined.push_str(&content);
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        }
        fs::remove_dir(&self.dir).with_context(|| format!("remove {}", self.dir.display()))?;
        Ok(combined)
    }

    /// Best-effort removal after a failed task, so abandoned chunks never
    /// leak into the round tree (and its archive).
    pub fn cleanup(self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_orders_by_ordinal_not_discovery() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("big.py");
        let store = ChunkStore::create_for(&file).expect("store");

        // Written out of order on purpose.
        store.write_chunk(10, "ten ").expect("write");
        store.write_chunk(2, "two ").expect("write");
        store.write_chunk(1, "one ").expect("write");

        let combined = store.combine().expect("combine");
        assert_eq!(combined, "one two ten ");
    }

    #[test]
    fn combine_removes_store_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("big.py");
        let store = ChunkStore::create_for(&file).expect("store");
        store.write_chunk(1, "a").expect("write");
        let dir = store.dir().to_path_buf();

        store.combine().expect("combine");
        assert!(!dir.exists());
    }

    #[test]
    fn combine_rejects_malformed_chunk_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("big.py");
        let store = ChunkStore::create_for(&file).expect("store");
        store.write_chunk(1, "a").expect("write");
        fs::write(store.dir().join("chunk_x.txt"), "rogue").expect("write rogue");
        let dir = store.dir().to_path_buf();

        let err = store.combine().unwrap_err();
        let ordinal_err = err
            .downcast_ref::<ChunkOrdinalError>()
            .expect("typed chunk error");
        assert_eq!(ordinal_err.name, "chunk_x.txt");
        // A failed combine must not leave the store behind either.
        assert!(!dir.exists());
    }

    #[test]
    fn create_for_clears_stale_store() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("big.py");
        let store = ChunkStore::create_for(&file).expect("store");
        store.write_chunk(1, "stale").expect("write");
        let dir = store.dir().to_path_buf();
        drop(store);

        let fresh = ChunkStore::create_for(&file).expect("store");
        assert_eq!(fresh.dir(), dir);
        assert_eq!(fs::read_dir(fresh.dir()).expect("read").count(), 0);
    }
}
