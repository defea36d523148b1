//! Side-effecting operations: config, oracle access, filesystem lifecycle.

pub mod archive;
pub mod chunk_store;
pub mod config;
pub mod oracle;
pub mod prompt;
pub mod snapshot;
