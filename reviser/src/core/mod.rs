//! Deterministic, pure logic for the revision pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! text and return deterministic outputs suitable for tests.

pub mod chunk;
pub mod extract;
pub mod lang;
