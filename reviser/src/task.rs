//! Per-file revision task: read → (split) → oracle → extract → write back.
//!
//! The dominant invariant lives here: one file's failure never aborts the
//! round or affects any other file. Every error (oracle unreachable,
//! malformed response, I/O) is converted at this boundary into a
//! copy-through fallback, so the output equals the input byte for byte, plus
//! a log entry. `process_file` therefore never returns an error to the Round
//! Manager, only a [`TaskOutcome`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::core::chunk::split_into_chunks;
use crate::core::extract::{Fragment, RevisionResult, extract_fragments, extract_single};
use crate::core::lang::{Language, extension_of};
use crate::io::chunk_store::ChunkStore;
use crate::io::config::{ReviserConfig, SplitMode};
use crate::io::oracle::{Oracle, OracleRequest};
use crate::io::prompt::PromptEngine;

/// How a single file task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Output written with the oracle's revision.
    Revised,
    /// Original fanned out into this many new files and was deleted.
    FannedOut { fragments: usize },
    /// Revision failed; output is a byte-for-byte copy of the input.
    Fallback { error: String },
}

/// Everything a file task needs besides its paths.
pub struct TaskContext<'a, O: Oracle + ?Sized> {
    pub oracle: &'a O,
    pub prompts: &'a PromptEngine,
    pub cfg: &'a ReviserConfig,
    /// Sampling temperature for the current round.
    pub temperature: f64,
}

/// Process one file, writing the result to `output_path` (in the round walk
/// both paths are the same). Never returns an error to the caller.
#[instrument(skip_all, fields(input = %input_path.display()))]
pub fn process_file<O: Oracle + ?Sized>(
    ctx: &TaskContext<'_, O>,
    input_path: &Path,
    output_path: &Path,
) -> TaskOutcome {
    match revise_file(ctx, input_path, output_path) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "revision failed, copying input through");
            if let Err(copy_err) = copy_through(input_path, output_path) {
                // Input and output are the same path in round processing, so
                // the original is still intact on disk; record both errors.
                warn!(error = %format!("{copy_err:#}"), "copy-through fallback failed");
            }
            TaskOutcome::Fallback {
                error: format!("{err:#}"),
            }
        }
    }
}

/// Fallible portion of the task. Any `Err` becomes a fallback in
/// [`process_file`].
fn revise_file<O: Oracle + ?Sized>(
    ctx: &TaskContext<'_, O>,
    input_path: &Path,
    output_path: &Path,
) -> Result<TaskOutcome> {
    let original = fs::read_to_string(input_path)
        .with_context(|| format!("read {}", input_path.display()))?;
    let language = language_of(input_path);

    if original.len() > ctx.cfg.split_threshold() {
        return match ctx.cfg.split_mode {
            SplitMode::Chunk => revise_in_chunks(ctx, input_path, output_path, &original, language),
            SplitMode::FanOut => fan_out(ctx, input_path, output_path, &original, language),
        };
    }

    let revised = revise_text(ctx, language, &original)?;
    write_atomic(output_path, &revised)?;
    debug!("file revised in place");
    Ok(TaskOutcome::Revised)
}

/// One oracle call in the single-block contract.
fn revise_text<O: Oracle + ?Sized>(
    ctx: &TaskContext<'_, O>,
    language: Language,
    text: &str,
) -> Result<String> {
    let prompt = ctx.prompts.render_revise(language, text)?;
    let response = ctx.oracle.revise(&OracleRequest {
        prompt,
        temperature: ctx.temperature,
    })?;
    Ok(extract_single(&response))
}

/// Chunk mode: split locally, revise each chunk independently, recombine in
/// original order through the destructive chunk store.
///
/// The combined text is written directly; resubmitting it whole would exceed
/// the same threshold that forced the split.
fn revise_in_chunks<O: Oracle + ?Sized>(
    ctx: &TaskContext<'_, O>,
    input_path: &Path,
    output_path: &Path,
    original: &str,
    language: Language,
) -> Result<TaskOutcome> {
    let chunks = split_into_chunks(original, language, ctx.cfg.split_threshold());
    info!(chunks = chunks.len(), "splitting oversized file");

    let store = ChunkStore::create_for(input_path)?;
    let revised_all = (|| -> Result<()> {
        for (i, chunk) in chunks.iter().enumerate() {
            let revised = revise_text(ctx, language, chunk)?;
            store.write_chunk(i + 1, &revised)?;
        }
        Ok(())
    })();
    if let Err(err) = revised_all {
        // Abandoned chunks must not leak into the round tree.
        store.cleanup();
        return Err(err);
    }
    let combined = store.combine()?;

    write_atomic(output_path, &combined)?;
    Ok(TaskOutcome::Revised)
}

/// Fan-out mode: the oracle splits the file itself; each fenced block in its
/// response becomes one new file next to the original, which is then
/// deleted.
fn fan_out<O: Oracle + ?Sized>(
    ctx: &TaskContext<'_, O>,
    input_path: &Path,
    output_path: &Path,
    original: &str,
    language: Language,
) -> Result<TaskOutcome> {
    let prompt = ctx.prompts.render_split(language, original)?;
    let response = ctx.oracle.revise(&OracleRequest {
        prompt,
        temperature: ctx.temperature,
    })?;

    let result = match extract_fragments(&response) {
        fragments if fragments.is_empty() => RevisionResult::Single(extract_single(&response)),
        fragments => RevisionResult::Fragments(fragments),
    };

    match result {
        RevisionResult::Single(revised) => {
            write_atomic(output_path, &revised)?;
            Ok(TaskOutcome::Revised)
        }
        RevisionResult::Fragments(fragments) => {
            let count = fragments.len();
            let written = write_fragments(input_path, &fragments)?;
            info!(fragments = count, "file fanned out");
            // The source is superseded by its parts; remove it last so a
            // failed write above leaves the original untouched.
            retire_source(input_path, &written)?;
            debug!(files = ?written, "fan-out files written");
            Ok(TaskOutcome::FannedOut { fragments: count })
        }
    }
}

/// Remove the fanned-out source file. If removal fails, the fallback keeps
/// the original, so the already-written parts must go too: the round must
/// never carry both the original and its parts forward.
fn retire_source(input_path: &Path, written: &[PathBuf]) -> Result<()> {
    if let Err(err) = fs::remove_file(input_path)
        .with_context(|| format!("remove fanned-out source {}", input_path.display()))
    {
        for part in written {
            let _ = fs::remove_file(part);
        }
        return Err(err);
    }
    Ok(())
}

/// Write via temp file + rename, so a write that fails partway (disk full)
/// never truncates the file being revised. The fallback path relies on the
/// original surviving any failed revision.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let tmp = path.with_file_name(format!("{name}.tmp"));
    if let Err(err) =
        fs::write(&tmp, contents).with_context(|| format!("write temp {}", tmp.display()))
    {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

/// Write fragments to `<stem>_part<N>.<ext>` next to the original, in
/// fence-encounter order. On any failure, already-written parts are removed
/// before the error propagates so the fallback path starts clean.
fn write_fragments(input_path: &Path, fragments: &[Fragment]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for fragment in fragments {
        let path = fragment_path(input_path, fragment.index);
        if let Err(err) =
            fs::write(&path, &fragment.content).with_context(|| format!("write {}", path.display()))
        {
            for stale in &written {
                let _ = fs::remove_file(stale);
            }
            return Err(err);
        }
        written.push(path);
    }
    if written.is_empty() {
        return Err(anyhow!("fan-out produced no fragments"));
    }
    Ok(written)
}

/// `src/app.py` + ordinal 2 → `src/app_part2.py`.
fn fragment_path(input_path: &Path, ordinal: usize) -> PathBuf {
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "part".to_string());
    let name = match input_path.extension() {
        Some(ext) => format!("{stem}_part{ordinal}.{}", ext.to_string_lossy()),
        None => format!("{stem}_part{ordinal}"),
    };
    input_path.with_file_name(name)
}

fn language_of(path: &Path) -> Language {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| extension_of(n))
        .map(|ext| Language::from_extension(&ext))
        .unwrap_or(Language::Other)
}

/// Byte-for-byte fallback copy. A no-op when input and output are the same
/// path, which is the round walk's normal case.
fn copy_through(input_path: &Path, output_path: &Path) -> Result<()> {
    if input_path == output_path {
        return Ok(());
    }
    fs::copy(input_path, output_path).with_context(|| {
        format!(
            "fallback copy {} to {}",
            input_path.display(),
            output_path.display()
        )
    })?;
    Ok(())
}
