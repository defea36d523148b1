//! Instruction templates for oracle calls.
//!
//! The exact wording is configuration, not logic: templates live as markdown
//! next to this module and are rendered with the code under revision. Two
//! templates exist, matching the two per-call contracts: `revise` expects a
//! single fenced block back, `split` asks for one block per output file.

use anyhow::Result;
use minijinja::{Environment, context};

use crate::core::lang::Language;

const REVISE_TEMPLATE: &str = include_str!("prompts/revise.md");
const SPLIT_TEMPLATE: &str = include_str!("prompts/split.md");

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("revise", REVISE_TEMPLATE)
            .expect("revise template should be valid");
        env.add_template("split", SPLIT_TEMPLATE)
            .expect("split template should be valid");
        Self { env }
    }

    /// Render the single-blob revision instruction.
    pub fn render_revise(&self, language: Language, code: &str) -> Result<String> {
        let template = self.env.get_template("revise")?;
        let rendered = template.render(context! {
            language => language_name(language),
            code => code,
        })?;
        Ok(rendered)
    }

    /// Render the multi-file split instruction.
    pub fn render_split(&self, language: Language, code: &str) -> Result<String> {
        let template = self.env.get_template("split")?;
        let rendered = template.render(context! {
            language => language_name(language),
            code => code,
        })?;
        Ok(rendered)
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn language_name(language: Language) -> &'static str {
    match language {
        Language::Python => "Python",
        Language::Java => "Java",
        Language::Cpp => "C++",
        Language::CSharp => "C#",
        Language::CsHtml => "Razor",
        Language::JavaScript => "JavaScript",
        Language::Html => "HTML",
        Language::Other => "source",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revise_prompt_embeds_code_and_language() {
        let engine = PromptEngine::new();
        let prompt = engine
            .render_revise(Language::Python, "print('hi')")
            .expect("render");
        assert!(prompt.contains("print('hi')"));
        assert!(prompt.contains("Python"));
        assert!(prompt.contains("single"));
    }

    #[test]
    fn split_prompt_asks_for_multiple_blocks() {
        let engine = PromptEngine::new();
        let prompt = engine
            .render_split(Language::Java, "class A {}")
            .expect("render");
        assert!(prompt.contains("class A {}"));
        assert!(prompt.contains("own markdown code block"));
    }
}
