//! Test-only helpers: scripted oracle and filesystem fixtures.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::io::oracle::{Oracle, OracleFailure, OracleRequest};

/// Oracle that replays a predetermined script instead of calling a model.
///
/// Responses are consumed front to back; a call past the end of the script
/// fails with a backend error, which keeps accidental extra calls visible in
/// test assertions.
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Result<String, OracleFailure>>>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(script: Vec<Result<String, OracleFailure>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script of successful raw responses.
    pub fn replying(replies: Vec<String>) -> Self {
        Self::new(replies.into_iter().map(Ok).collect())
    }

    /// Script with a single failure up front.
    pub fn failing(failure: OracleFailure) -> Self {
        Self::new(vec![Err(failure)])
    }

    /// Number of revise calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Oracle for ScriptedOracle {
    fn revise(&self, _request: &OracleRequest) -> Result<String, OracleFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(OracleFailure::Backend("scripted oracle exhausted".into())))
    }
}

/// A markdown response containing one fenced block.
pub fn fenced(tag: &str, body: &str) -> String {
    format!("Here is the revised code:\n```{tag}\n{body}```\n")
}

/// Write `content` to `root/rel`, creating parent directories. Returns the
/// full path.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(&path, content).expect("write fixture file");
    path
}
