//! Markdown rendering with Tufte expansion and ToC extraction.
//!
//! Two engines produce the initial HTML: pulldown-cmark (the default) or
//! the bundled fallback converter. Everything downstream of the engine
//! (sidenote expansion, heading extraction, id injection) is shared, so
//! either choice yields the same page structure.

use pulldown_cmark::{Options, Parser, html};
use serde::Deserialize;

use super::basic;
use super::toc::{self, Heading};
use super::tufte;

/// Which markdown engine converts body text to HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownEngine {
    /// Full-featured conversion via pulldown-cmark.
    #[default]
    Pulldown,
    /// The minimal built-in converter.
    Basic,
}

/// Result of rendering a document body.
pub struct RenderedBody {
    pub html: String,
    pub headings: Vec<Heading>,
}

/// Convert markdown to HTML with Tufte extensions applied and heading ids
/// injected. Sidenote numbering and heading slugs are scoped to this one
/// call.
pub fn markdown_to_html(text: &str, engine: MarkdownEngine) -> RenderedBody {
    let html = match engine {
        MarkdownEngine::Pulldown => render_pulldown(text),
        MarkdownEngine::Basic => basic::convert(text),
    };

    let html = tufte::expand_sidenotes(&html);
    let html = tufte::expand_newthought(&html);

    let headings = toc::extract_headings(&html);
    let html = toc::inject_ids(&html, &headings);

    RenderedBody { html, headings }
}

fn render_pulldown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(markdown, options);

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let output = markdown_to_html("## Hello\n\nWorld", MarkdownEngine::Pulldown);

        assert!(output.html.contains("Hello"));
        assert!(output.html.contains("<p>World</p>"));
        assert_eq!(output.headings.len(), 1);
        assert_eq!(output.headings[0].text, "Hello");
        assert_eq!(output.headings[0].level, 2);
    }

    #[test]
    fn test_heading_ids_injected() {
        let output = markdown_to_html("## My Section", MarkdownEngine::Pulldown);

        assert!(output.html.contains("id=\"my-section\""));
    }

    #[test]
    fn test_sidenotes_expanded_after_conversion() {
        let output = markdown_to_html(
            "Some text{sn}a note{/sn} and{mn}a margin note{/mn}.",
            MarkdownEngine::Pulldown,
        );

        assert!(output.html.contains("id=\"sn-1\""));
        assert!(output.html.contains("id=\"mn-2\""));
        assert!(!output.html.contains("{sn}"));
    }

    #[test]
    fn test_newthought_expanded() {
        let output = markdown_to_html("{nt}Begin{/nt} the section.", MarkdownEngine::Pulldown);

        assert!(output.html.contains("<span class=\"newthought\">Begin</span>"));
    }

    #[test]
    fn test_engines_agree_on_structure() {
        let source = "## Section One\n\nText{sn}note{/sn} here.\n\n## Section Two";

        for engine in [MarkdownEngine::Pulldown, MarkdownEngine::Basic] {
            let output = markdown_to_html(source, engine);
            assert_eq!(output.headings.len(), 2, "engine {engine:?}");
            assert_eq!(output.headings[0].id, "section-one");
            assert_eq!(output.headings[1].id, "section-two");
            assert!(output.html.contains("id=\"sn-1\""));
        }
    }

    #[test]
    fn test_basic_engine_table() {
        let source = "| A | B |\n|---|---|\n| 1 | 2 |";
        let output = markdown_to_html(source, MarkdownEngine::Basic);

        assert!(output.html.contains("<table>"));
        assert!(output.html.contains("<th>A</th>"));
    }
}
