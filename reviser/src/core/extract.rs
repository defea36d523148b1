//! Fenced-code-block extraction from raw oracle responses.
//!
//! The oracle replies in free-form markdown. Depending on the call contract
//! the response carries either zero-or-one fenced block (plain revision) or
//! several blocks, one per output file (fan-out). The two shapes are
//! modelled explicitly as [`RevisionResult`] rather than inspected at
//! runtime by the caller.

use std::sync::LazyLock;

use regex::Regex;

/// Greedy, non-nested match of a triple-backtick fenced region.
///
/// Group 1 is the info string on the opening fence line (may be empty),
/// group 2 the body up to the closing fence. Non-greedy body so adjacent
/// fences stay separate.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([^\n]*)\n(.*?)```").expect("fence regex should be valid")
});

/// One named unit of output recovered from a multi-block response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// 1-based position in fence-encounter order.
    pub index: usize,
    /// Filename or language hint from the fence, if one was present.
    pub hint: Option<String>,
    pub content: String,
}

/// Outcome of extraction, tagged by response shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionResult {
    /// A single revised text blob.
    Single(String),
    /// Ordered per-file fragments from a fan-out response.
    Fragments(Vec<Fragment>),
}

/// Extract a single revised text from `response`.
///
/// Takes the first fenced block, stripping the fence markers and a bare
/// language-tag first line. When the response contains no fence at all the
/// entire response is used, trimmed (best-effort fallback: the oracle
/// answered, just not in the expected format).
pub fn extract_single(response: &str) -> String {
    match FENCE.captures(response) {
        Some(caps) => body_without_hint(&caps).1,
        None => response.trim().to_string(),
    }
}

/// Extract every fenced block as an ordered [`Fragment`].
///
/// Fragment ordering is fence-encounter order, never anything derived from
/// the hint line. An empty vec means the response held no fences; the caller
/// decides whether to fall back to [`extract_single`].
pub fn extract_fragments(response: &str) -> Vec<Fragment> {
    FENCE
        .captures_iter(response)
        .enumerate()
        .map(|(i, caps)| {
            let (hint, content) = body_without_hint(&caps);
            Fragment {
                index: i + 1,
                hint,
                content,
            }
        })
        .collect()
}

/// Split a fence capture into (hint, body).
///
/// The hint is the opening-fence info string when present. With a bare
/// opening fence, a first body line that is a single short token (e.g. a
/// language name the model put inside the fence) is treated as the hint and
/// dropped instead.
fn body_without_hint(caps: &regex::Captures<'_>) -> (Option<String>, String) {
    let info = caps[1].trim();
    let body = &caps[2];
    if !info.is_empty() {
        return (Some(info.to_string()), body.to_string());
    }
    if let Some((first, rest)) = body.split_once('\n') {
        if is_bare_tag(first) {
            return (Some(first.trim().to_string()), rest.to_string());
        }
    }
    (None, body.to_string())
}

/// A bare tag is one short token shaped like a language name or file name:
/// `python`, `c++`, `Program.cs`. It must start with a letter and contain
/// only alphanumerics and `+ # . _ -`, so code-looking lines such as `x=1`
/// or `})` are kept as body.
fn is_bare_tag(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() <= 40
        && trimmed.starts_with(|c: char| c.is_ascii_alphabetic())
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '.' | '_' | '-'))
}
