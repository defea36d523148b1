//! Round directory snapshotting and walking.
//!
//! Each round works on a full recursive copy of the previous round's tree
//! (or the original input for round 1), so later rounds never mutate
//! earlier rounds and ineligible files ride along unchanged.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;
use walkdir::WalkDir;

use crate::io::config::ReviserConfig;

/// Recursively copy `src` into `dst`, creating `dst`. Returns the number of
/// regular files copied. Symlinks are not followed.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Err(anyhow!("snapshot source {} is not a directory", src.display()));
    }
    fs::create_dir_all(dst).with_context(|| format!("create {}", dst.display()))?;

    let mut copied = 0usize;
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.with_context(|| format!("walk {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .expect("walkdir yields paths under its root");
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("create {}", target.display()))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).with_context(|| {
                format!("copy {} to {}", entry.path().display(), target.display())
            })?;
            copied += 1;
        }
    }
    debug!(files = copied, src = %src.display(), dst = %dst.display(), "snapshot copied");
    Ok(copied)
}

/// Walk `root` and collect every regular file whose extension is in the
/// config allow-list, in a stable (sorted) order.
pub fn eligible_files(root: &Path, cfg: &ReviserConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", root.display()))?;
        if entry.file_type().is_file() && cfg.is_eligible(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_file;

    #[test]
    fn copy_tree_mirrors_nested_structure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let src = temp.path().join("src");
        write_file(&src, "a.py", "print()");
        write_file(&src, "nested/deep/b.txt", "data");

        let dst = temp.path().join("dst");
        let copied = copy_tree(&src, &dst).expect("copy");

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dst.join("a.py")).expect("read"), "print()");
        assert_eq!(
            fs::read_to_string(dst.join("nested/deep/b.txt")).expect("read"),
            "data"
        );
    }

    #[test]
    fn copy_tree_rejects_missing_source() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = copy_tree(&temp.path().join("absent"), &temp.path().join("dst")).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn eligible_files_filters_by_allow_list() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("round_1");
        write_file(&root, "keep.py", "");
        write_file(&root, "KEEP.Java", "");
        write_file(&root, "skip.txt", "");
        write_file(&root, "sub/also.js", "");

        let cfg = ReviserConfig::default();
        let files = eligible_files(&root, &cfg).expect("walk");
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(&root)
                    .expect("under root")
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(names, vec!["KEEP.Java", "keep.py", "sub/also.js"]);
    }
}
