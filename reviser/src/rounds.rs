//! Round lifecycle: snapshot, lazy archiving, file dispatch.
//!
//! A round owns one directory tree under `<output>/round_<N>`: a full copy
//! of the previous round (or the original input for round 1). Before a
//! round's files are walked, every older round that still exists
//! uncompressed is archived. Archiving lags exactly one round behind the
//! active one, so disk growth stays bounded while the most recent completed
//! round remains available for diffing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{error, info, instrument};

use crate::io::archive::{ArchiveOutcome, archive_round};
use crate::io::config::ReviserConfig;
use crate::io::oracle::Oracle;
use crate::io::prompt::PromptEngine;
use crate::io::snapshot::{copy_tree, eligible_files};
use crate::task::{TaskContext, TaskOutcome, process_file};

/// Per-round processing summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub round: u32,
    /// Eligible files dispatched to the task processor.
    pub files_processed: usize,
    pub revised: usize,
    pub fanned_out: usize,
    pub fallbacks: usize,
    /// Prior rounds compressed before this round's walk.
    pub archived: usize,
}

/// Directory for a 1-based round number.
pub fn round_dir(output_dir: &Path, round: u32) -> PathBuf {
    output_dir.join(format!("round_{round}"))
}

/// Run one round: snapshot the source tree, archive superseded rounds, then
/// dispatch every eligible file.
///
/// Per-file failures are absorbed by the task processor; only structural
/// failures (snapshot copy, walking) propagate and abort the pipeline.
#[instrument(skip_all, fields(round = round))]
pub fn run_round<O: Oracle + ?Sized>(
    oracle: &O,
    prompts: &PromptEngine,
    cfg: &ReviserConfig,
    input_dir: &Path,
    output_dir: &Path,
    round: u32,
) -> Result<RoundOutcome> {
    if round == 0 {
        return Err(anyhow!("rounds are 1-based"));
    }
    let dir = round_dir(output_dir, round);
    let source = if round == 1 {
        input_dir.to_path_buf()
    } else {
        round_dir(output_dir, round - 1)
    };
    info!(source = %source.display(), dir = %dir.display(), "starting round");

    copy_tree(&source, &dir)
        .with_context(|| format!("snapshot round {round} from {}", source.display()))?;

    let archived = archive_prior_rounds(output_dir, round);

    let files = eligible_files(&dir, cfg)?;
    let ctx = TaskContext {
        oracle,
        prompts,
        cfg,
        temperature: cfg.temperature_for_round(round),
    };

    let mut outcome = RoundOutcome {
        round,
        files_processed: files.len(),
        revised: 0,
        fanned_out: 0,
        fallbacks: 0,
        archived,
    };
    for file in &files {
        match process_file(&ctx, file, file) {
            TaskOutcome::Revised => outcome.revised += 1,
            TaskOutcome::FannedOut { .. } => outcome.fanned_out += 1,
            TaskOutcome::Fallback { .. } => outcome.fallbacks += 1,
        }
    }

    info!(
        files = outcome.files_processed,
        revised = outcome.revised,
        fanned_out = outcome.fanned_out,
        fallbacks = outcome.fallbacks,
        "round complete"
    );
    Ok(outcome)
}

/// Archive every round strictly older than `current_round` that still exists
/// uncompressed, in ascending order.
///
/// Each archive is independent: a failure is logged and the remaining rounds
/// (and the current round's processing) continue. Already-archived or
/// missing rounds are skipped with a warning inside the archiver.
pub fn archive_prior_rounds(output_dir: &Path, current_round: u32) -> usize {
    let mut archived = 0;
    for round in 1..current_round {
        let dir = round_dir(output_dir, round);
        match archive_round(&dir) {
            Ok(ArchiveOutcome::Archived(_)) => archived += 1,
            Ok(ArchiveOutcome::SkippedMissing) => {}
            Err(err) => {
                error!(round, error = %format!("{err:#}"), "archiving failed, source preserved");
            }
        }
    }
    archived
}
