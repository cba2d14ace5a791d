//! Fallback markdown converter.
//!
//! A deliberately small markdown-to-HTML transformer used when the
//! pulldown engine is disabled in config. Supports headings, emphasis,
//! inline code, links, flat lists, pipe tables, fenced code blocks, and
//! paragraphs. The output shape is close enough to pulldown-cmark's that
//! the sidenote and ToC stages behave identically on either.
//!
//! Pass order matters: fenced code blocks are swapped for opaque
//! placeholders first so no later rule touches their interior, and they
//! are restored byte-for-byte at the end. List and table detection are
//! line-oriented and do not handle nesting; that is a parity limit, not a
//! bug.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(\w*)\n(.*?)```").unwrap());
// Longest heading prefix first so "###" is never half-matched by "##".
static H3_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.+)$").unwrap());
static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.+)$").unwrap());
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.+)$").unwrap());
// Bold before italic: the single-star pattern is a subset of the double.
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.+?)`").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").unwrap());
static ORDERED_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").unwrap());

/// Convert markdown text to HTML.
pub fn convert(text: &str) -> String {
    // Protect fenced code blocks (they may contain blank lines and markup).
    let mut code_blocks: Vec<String> = Vec::new();
    let text = CODE_BLOCK_RE.replace_all(text, |caps: &Captures| {
        code_blocks.push(caps[2].to_string());
        format!("__CODE_BLOCK_{}__", code_blocks.len() - 1)
    });

    let text = H3_RE.replace_all(&text, "<h3>$1</h3>");
    let text = H2_RE.replace_all(&text, "<h2>$1</h2>");
    let text = H1_RE.replace_all(&text, "<h1>$1</h1>");

    let text = BOLD_RE.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC_RE.replace_all(&text, "<em>$1</em>");
    let text = CODE_RE.replace_all(&text, "<code>$1</code>");
    let text = LINK_RE.replace_all(&text, "<a href=\"$2\">$1</a>");

    let text = convert_lists(&text);
    let text = convert_tables(&text);
    let mut text = wrap_paragraphs(&text);

    for (i, code) in code_blocks.iter().enumerate() {
        text = text.replace(
            &format!("__CODE_BLOCK_{i}__"),
            &format!("<pre><code>{code}</code></pre>"),
        );
    }

    text
}

#[derive(Clone, Copy, PartialEq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Group contiguous `- item` / `1. item` lines into `<ul>`/`<ol>` blocks.
///
/// A run ends on any non-list line or on a change of list kind; the
/// accumulated run is flushed as one block before continuing.
fn convert_lists(text: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut current: Option<(ListKind, Vec<String>)> = None;

    let flush = |current: &mut Option<(ListKind, Vec<String>)>, result: &mut Vec<String>| {
        if let Some((kind, items)) = current.take() {
            result.push(render_list(kind, &items));
        }
    };

    for line in text.split('\n') {
        let stripped = line.trim();

        if let Some(item) = stripped.strip_prefix("- ") {
            if current.as_ref().is_some_and(|(kind, _)| *kind != ListKind::Unordered) {
                flush(&mut current, &mut result);
            }
            current
                .get_or_insert_with(|| (ListKind::Unordered, Vec::new()))
                .1
                .push(item.to_string());
        } else if let Some(caps) = ORDERED_ITEM_RE.captures(stripped) {
            if current.as_ref().is_some_and(|(kind, _)| *kind != ListKind::Ordered) {
                flush(&mut current, &mut result);
            }
            current
                .get_or_insert_with(|| (ListKind::Ordered, Vec::new()))
                .1
                .push(caps[2].to_string());
        } else {
            flush(&mut current, &mut result);
            result.push(line.to_string());
        }
    }
    flush(&mut current, &mut result);

    result.join("\n")
}

fn render_list(kind: ListKind, items: &[String]) -> String {
    let tag = kind.tag();
    let li_items: Vec<String> = items.iter().map(|item| format!("<li>{item}</li>")).collect();
    format!("<{tag}>\n{}\n</{tag}>", li_items.join("\n"))
}

/// Group contiguous `|`-delimited lines into `<table>` blocks.
fn convert_tables(text: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut rows: Vec<String> = Vec::new();

    for line in text.split('\n') {
        let stripped = line.trim();
        if stripped.starts_with('|') && stripped.ends_with('|') {
            rows.push(stripped.to_string());
        } else {
            if !rows.is_empty() {
                result.push(render_table(&rows));
                rows.clear();
            }
            result.push(line.to_string());
        }
    }
    if !rows.is_empty() {
        result.push(render_table(&rows));
    }

    result.join("\n")
}

/// Render buffered table rows. Fewer than 2 rows is not a table and
/// degrades to plain passthrough text. The first row is the header, the
/// second (separator) row is discarded, the rest are body rows.
fn render_table(rows: &[String]) -> String {
    if rows.len() < 2 {
        return rows.join("\n");
    }

    let mut html = vec!["<table>".to_string()];

    html.push("<thead><tr>".to_string());
    for cell in split_cells(&rows[0]) {
        html.push(format!("<th>{cell}</th>"));
    }
    html.push("</tr></thead>".to_string());

    html.push("<tbody>".to_string());
    for row in &rows[2..] {
        html.push("<tr>".to_string());
        for cell in split_cells(row) {
            html.push(format!("<td>{cell}</td>"));
        }
        html.push("</tr>".to_string());
    }
    html.push("</tbody>".to_string());

    html.push("</table>".to_string());
    html.join("\n")
}

/// Split a `|`-delimited row into trimmed cells, dropping the empty
/// leading/trailing fields produced by the outer pipes.
fn split_cells(row: &str) -> Vec<&str> {
    let fields: Vec<&str> = row.split('|').collect();
    fields[1..fields.len() - 1]
        .iter()
        .map(|cell| cell.trim())
        .collect()
}

const BLOCK_PREFIXES: [&str; 6] = ["<h", "<pre", "<ul", "<ol", "<table", "__CODE_BLOCK_"];

/// Wrap non-block chunks (split on blank lines) in paragraph tags.
fn wrap_paragraphs(text: &str) -> String {
    let processed: Vec<String> = text
        .split("\n\n")
        .filter_map(|chunk| {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                None
            } else if BLOCK_PREFIXES.iter().any(|prefix| chunk.starts_with(prefix)) {
                Some(chunk.to_string())
            } else {
                Some(format!("<p>{chunk}</p>"))
            }
        })
        .collect();

    processed.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        assert!(convert("# Header One").contains("<h1>Header One</h1>"));
        assert!(convert("## Header Two").contains("<h2>Header Two</h2>"));
        assert!(convert("### Header Three").contains("<h3>Header Three</h3>"));
    }

    #[test]
    fn test_h3_not_half_matched_by_h2() {
        let result = convert("### Three");
        assert!(!result.contains("<h2>"));
        assert!(result.contains("<h3>Three</h3>"));
    }

    #[test]
    fn test_bold_and_italic() {
        let result = convert("This is **bold** and *italic* text.");

        assert!(result.contains("<strong>bold</strong>"));
        assert!(result.contains("<em>italic</em>"));
    }

    #[test]
    fn test_inline_code() {
        assert!(convert("Use `code` here.").contains("<code>code</code>"));
    }

    #[test]
    fn test_link() {
        let result = convert("Visit [Example](https://example.com) site.");
        assert!(result.contains("<a href=\"https://example.com\">Example</a>"));
    }

    #[test]
    fn test_unordered_list() {
        let result = convert("- Item one\n- Item two\n- Item three");

        assert!(result.contains("<ul>"));
        assert!(result.contains("<li>Item one</li>"));
        assert!(result.contains("<li>Item three</li>"));
        assert!(result.contains("</ul>"));
    }

    #[test]
    fn test_ordered_list() {
        let result = convert("1. First\n2. Second\n3. Third");

        assert!(result.contains("<ol>"));
        assert!(result.contains("<li>First</li>"));
        assert!(result.contains("</ol>"));
    }

    #[test]
    fn test_list_run_ends_on_kind_change() {
        let result = convert("- Bullet\n1. Numbered");

        assert!(result.contains("<ul>\n<li>Bullet</li>\n</ul>"));
        assert!(result.contains("<ol>\n<li>Numbered</li>\n</ol>"));
    }

    #[test]
    fn test_list_interrupted_by_text() {
        let result = convert("- One\n- Two\n\nA paragraph.\n\n- Three");

        assert_eq!(result.matches("<ul>").count(), 2);
        assert!(result.contains("<p>A paragraph.</p>"));
    }

    #[test]
    fn test_table() {
        let text = "| Name | Value |\n|------|-------|\n| a | 1 |\n| b | 2 |";
        let result = convert(text);

        assert!(result.contains("<table>"));
        assert!(result.contains("<thead>"));
        assert!(result.contains("<th>Name</th>"));
        assert!(result.contains("<th>Value</th>"));
        assert!(result.contains("<td>a</td>"));
        assert!(result.contains("<td>2</td>"));
        // Separator row is discarded, not rendered.
        assert!(!result.contains("------"));
    }

    #[test]
    fn test_table_body_rows_in_order() {
        let text = "| H |\n|---|\n| first |\n| second |";
        let result = convert(text);

        let first = result.find("<td>first</td>").unwrap();
        let second = result.find("<td>second</td>").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_single_pipe_line_is_not_a_table() {
        let result = convert("| not a table |");

        assert!(!result.contains("<table>"));
        assert!(result.contains("| not a table |"));
    }

    #[test]
    fn test_paragraphs() {
        let result = convert("First paragraph.\n\nSecond paragraph.");

        assert!(result.contains("<p>First paragraph.</p>"));
        assert!(result.contains("<p>Second paragraph.</p>"));
    }

    #[test]
    fn test_heading_not_wrapped_in_paragraph() {
        let result = convert("# Title\n\nBody text.");

        assert!(!result.contains("<p><h1>"));
        assert!(result.contains("<p>Body text.</p>"));
    }

    #[test]
    fn test_code_block_preserved_verbatim() {
        let text = "Before\n\n```python\ndef f():\n    return **not bold** # not a heading\n```\n\nAfter";
        let result = convert(text);

        assert!(result
            .contains("<pre><code>def f():\n    return **not bold** # not a heading\n</code></pre>"));
        assert!(!result.contains("<strong>not bold</strong>"));
    }

    #[test]
    fn test_code_block_language_tag_ignored() {
        let result = convert("```rust\nlet x = 1;\n```");

        assert!(result.contains("<pre><code>let x = 1;\n</code></pre>"));
        assert!(!result.contains("rust"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), "");
    }
}
