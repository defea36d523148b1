//! Heuristic splitting of oversized files into oracle-sized chunks.
//!
//! Splitting is keyword-based, not grammar-based: a line that starts (after
//! indentation) with one of the language's boundary keywords is a candidate
//! chunk boundary. Chunks may therefore be syntactically incomplete. This is
//! a known limitation of the design, accepted in exchange for working on any
//! of the supported languages without a parser.
//!
//! Invariant: concatenating the returned chunks reproduces the input text
//! byte for byte.

use crate::core::lang::Language;

/// Split `text` into chunks of roughly `max_chunk_bytes`, breaking only at
/// boundary-keyword lines for `language`.
///
/// A chunk is closed as soon as it has reached `max_chunk_bytes` *and* the
/// next line begins with a boundary keyword. A file with no boundaries past
/// the limit yields one oversized chunk rather than a mid-expression cut.
pub fn split_into_chunks(text: &str, language: Language, max_chunk_bytes: usize) -> Vec<String> {
    if text.len() <= max_chunk_bytes {
        return vec![text.to_string()];
    }

    let keywords = language.boundary_keywords();
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in split_inclusive_lines(text) {
        if current.len() >= max_chunk_bytes && is_boundary_line(line, keywords) {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

fn is_boundary_line(line: &str, keywords: &[&str]) -> bool {
    let trimmed = line.trim_start();
    keywords.iter().any(|kw| trimmed.starts_with(kw))
}

/// Like `str::split_inclusive('\n')` but total: yields nothing for an empty
/// string, otherwise every line with its terminator when present.
fn split_inclusive_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive('\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_source(methods: usize, body_lines: usize) -> String {
        let mut out = String::new();
        for m in 0..methods {
            out.push_str(&format!("def method_{m}(self):\n"));
            for b in 0..body_lines {
                out.push_str(&format!("    value_{b} = {b}\n"));
            }
        }
        out
    }

    #[test]
    fn small_text_is_one_chunk() {
        let text = "def f():\n    pass\n";
        let chunks = split_into_chunks(text, Language::Python, 1024);
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn chunks_break_only_at_boundary_keywords() {
        let text = python_source(8, 10);
        let chunks = split_into_chunks(&text, Language::Python, 200);
        assert!(chunks.len() > 1);
        for chunk in chunks.iter().skip(1) {
            assert!(
                chunk.starts_with("def "),
                "chunk should start at a boundary: {chunk:?}"
            );
        }
    }

    #[test]
    fn concatenation_reproduces_input_exactly() {
        let text = python_source(12, 6);
        let chunks = split_into_chunks(&text, Language::Python, 150);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn input_without_trailing_newline_round_trips() {
        let mut text = python_source(6, 4);
        text.push_str("x = 1");
        let chunks = split_into_chunks(&text, Language::Python, 100);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn no_boundaries_yields_single_oversized_chunk() {
        let text = "    indented = 1\n".repeat(50);
        let chunks = split_into_chunks(&text, Language::Python, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }
}
