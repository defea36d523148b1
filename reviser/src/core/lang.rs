//! Language identification for chunk-boundary heuristics.
//!
//! Eligibility (which files get revised at all) is decided by the config
//! allow-list, not here. This module only maps an extension to the keyword
//! set used when an oversized file must be split.

/// Source language inferred from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Java,
    Cpp,
    CSharp,
    CsHtml,
    JavaScript,
    Html,
    /// Allowed by config but not one of the known languages.
    Other,
}

impl Language {
    /// Infer a language from a lowercase extension (no leading dot).
    pub fn from_extension(ext: &str) -> Language {
        match ext {
            "py" => Language::Python,
            "java" => Language::Java,
            "cpp" | "cc" | "cxx" | "h" | "hpp" => Language::Cpp,
            "cs" => Language::CSharp,
            "cshtml" => Language::CsHtml,
            "js" | "jsx" | "ts" | "tsx" => Language::JavaScript,
            "html" | "htm" => Language::Html,
            _ => Language::Other,
        }
    }

    /// Line-start keywords treated as chunk boundaries when splitting an
    /// oversized file.
    ///
    /// This is a substring heuristic, not a parser. A boundary keyword at the
    /// start of a line is *probably* a declaration, and splitting there keeps
    /// most methods intact, but chunks are not guaranteed to be syntactically
    /// complete.
    pub fn boundary_keywords(self) -> &'static [&'static str] {
        match self {
            Language::Python => &["def ", "class ", "async def "],
            Language::Java | Language::CSharp => &[
                "public ", "private ", "protected ", "internal ", "static ", "class ",
            ],
            Language::Cpp => &[
                "void ", "int ", "bool ", "class ", "struct ", "template", "static ",
            ],
            Language::CsHtml | Language::Html => &["<div", "<section", "<script", "<body"],
            Language::JavaScript => &[
                "function ", "class ", "export ", "const ", "async function ",
            ],
            Language::Other => &["function ", "def ", "class ", "public "],
        }
    }
}

/// Lowercase extension of a file name, if any.
pub fn extension_of(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_languages() {
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("cshtml"), Language::CsHtml);
        assert_eq!(Language::from_extension("rb"), Language::Other);
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("Main.JAVA").as_deref(), Some("java"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of("archive."), None);
    }

    #[test]
    fn every_language_has_boundary_keywords() {
        for lang in [
            Language::Python,
            Language::Java,
            Language::Cpp,
            Language::CSharp,
            Language::CsHtml,
            Language::JavaScript,
            Language::Html,
            Language::Other,
        ] {
            assert!(!lang.boundary_keywords().is_empty());
        }
    }
}
