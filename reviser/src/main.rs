//! Round-based batch code revision CLI.
//!
//! Revises every recognized source file under the input directory with a
//! generative oracle, over N sequential rounds; each round works on a full
//! snapshot of the previous one and older rounds are archived to
//! `round_<N>_archive.tar.gz`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use reviser::io::config::load_config;
use reviser::io::oracle::HttpOracle;
use reviser::logging;
use reviser::pipeline::run_pipeline;

#[derive(Parser)]
#[command(
    name = "reviser",
    version,
    about = "Iterative oracle-driven source revision pipeline"
)]
struct Cli {
    /// Directory of source files to revise (never mutated).
    input: PathBuf,
    /// Directory receiving round_<N> trees and archives.
    output: PathBuf,
    /// Number of revision rounds to run.
    #[arg(long, default_value_t = 1)]
    rounds: u32,
    /// Config file path.
    #[arg(long, default_value = "reviser.toml")]
    config: PathBuf,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(&cli.config)
        .with_context(|| format!("load config {}", cli.config.display()))?;
    let oracle = HttpOracle::new(&cfg.oracle).context("construct oracle client")?;

    let summary = run_pipeline(&oracle, &cfg, &cli.input, &cli.output, cli.rounds)?;

    for round in &summary.rounds {
        println!(
            "round: n={} files={} revised={} fanned_out={} fallbacks={} archived={}",
            round.round,
            round.files_processed,
            round.revised,
            round.fanned_out,
            round.fallbacks,
            round.archived
        );
    }
    println!(
        "done: rounds={} elapsed_secs={:.2}",
        summary.rounds.len(),
        summary.elapsed.as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let cli = Cli::parse_from(["reviser", "Source", "Output"]);
        assert_eq!(cli.rounds, 1);
        assert_eq!(cli.config, PathBuf::from("reviser.toml"));
    }

    #[test]
    fn parse_rounds_flag() {
        let cli = Cli::parse_from(["reviser", "Source", "Output", "--rounds", "100"]);
        assert_eq!(cli.rounds, 100);
        assert_eq!(cli.input, PathBuf::from("Source"));
        assert_eq!(cli.output, PathBuf::from("Output"));
    }
}
