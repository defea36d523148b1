//! Top-level sequencing of revision rounds.
//!
//! Rounds are strictly sequential: round N consumes round N-1's output, so
//! there is no cross-round parallelism by design. The driver owns round
//! numbering and total elapsed-time accounting; per-file failures are
//! absorbed far below this level and never influence the exit status.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tracing::info;

use crate::io::config::ReviserConfig;
use crate::io::oracle::Oracle;
use crate::io::prompt::PromptEngine;
use crate::rounds::{RoundOutcome, run_round};

/// Summary of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub rounds: Vec<RoundOutcome>,
    pub elapsed: Duration,
}

/// Run `rounds` revision rounds of `input_dir` into `output_dir`.
///
/// Creates `output_dir` when missing. Returns an error only for structural
/// failures (bad input dir, snapshot copy, walking); a round with nothing
/// but per-file fallbacks still counts as completed.
pub fn run_pipeline<O: Oracle + ?Sized>(
    oracle: &O,
    cfg: &ReviserConfig,
    input_dir: &Path,
    output_dir: &Path,
    rounds: u32,
) -> Result<PipelineSummary> {
    if rounds == 0 {
        return Err(anyhow!("round count must be >= 1"));
    }
    if !input_dir.is_dir() {
        return Err(anyhow!("input {} is not a directory", input_dir.display()));
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;

    let prompts = PromptEngine::new();
    let start = Instant::now();
    let mut outcomes = Vec::with_capacity(rounds as usize);
    for round in 1..=rounds {
        let outcome = run_round(oracle, &prompts, cfg, input_dir, output_dir, round)
            .with_context(|| format!("round {round}"))?;
        outcomes.push(outcome);
    }

    let elapsed = start.elapsed();
    info!(
        rounds,
        elapsed_secs = elapsed.as_secs_f64(),
        "pipeline complete"
    );
    Ok(PipelineSummary {
        rounds: outcomes,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedOracle, fenced, write_file};

    #[test]
    fn zero_rounds_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let oracle = ScriptedOracle::replying(Vec::new());
        let cfg = ReviserConfig::default();
        let err = run_pipeline(&oracle, &cfg, temp.path(), &temp.path().join("out"), 0)
            .unwrap_err();
        assert!(err.to_string().contains(">= 1"));
    }

    #[test]
    fn missing_input_dir_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let oracle = ScriptedOracle::replying(Vec::new());
        let cfg = ReviserConfig::default();
        let err = run_pipeline(
            &oracle,
            &cfg,
            &temp.path().join("absent"),
            &temp.path().join("out"),
            1,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn creates_output_dir_and_reports_every_round() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = temp.path().join("input");
        write_file(&input, "a.py", "v0\n");
        let output = temp.path().join("deep/output");

        let oracle = ScriptedOracle::replying(vec![
            fenced("python", "v1\n"),
            fenced("python", "v2\n"),
            fenced("python", "v3\n"),
        ]);
        let cfg = ReviserConfig::default();

        let summary = run_pipeline(&oracle, &cfg, &input, &output, 3).expect("pipeline");

        assert_eq!(summary.rounds.len(), 3);
        assert_eq!(
            summary.rounds.iter().map(|r| r.round).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(output.join("round_3").exists());
    }
}
