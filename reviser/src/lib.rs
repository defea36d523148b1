//! Round-based batch code revision driven by a generative oracle.
//!
//! This crate repeatedly rewrites a directory of source files: each round
//! snapshots the previous round's output, sends every recognized file to a
//! code-revision oracle, and writes the oracle's answer back in place, while
//! superseded rounds are compressed away. The architecture enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (fence extraction, chunk
//!   splitting, language heuristics). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, oracle HTTP access,
//!   snapshots, chunk store, archiving). Isolated to enable scripted fakes
//!   in tests.
//!
//! Orchestration modules ([`task`], [`rounds`], [`pipeline`]) coordinate
//! core logic with I/O. The failure-isolation contract is central: a
//! failing file falls back to a byte-identical copy and the round carries
//! on.

pub mod core;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod rounds;
pub mod task;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
