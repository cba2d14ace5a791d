//! Heading extraction, id injection, and table of contents rendering.
//!
//! Both extraction and injection consume the same `scan_headings` match
//! set, so the two passes can never drift apart: injection pairs each
//! scanned element with the extracted heading at the same index.
//!
//! Ids already present in the HTML are kept verbatim and never rewritten,
//! which makes running extract + inject over already-injected output a
//! no-op.

use std::sync::LazyLock;

use regex::Regex;

/// A level-2 or level-3 heading with its anchor id and plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    pub text: String,
}

static OPEN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<h([23])((?:\s+[^>]*)?)>"#).unwrap());
static ID_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\bid="([^"]*)""#).unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// One `<h2>`/`<h3>` element located in the HTML.
struct HeadingMatch<'a> {
    /// Byte range of the whole element, open tag through close tag.
    start: usize,
    end: usize,
    level: u8,
    /// Raw attribute text from the open tag (leading space included).
    attrs: &'a str,
    /// Inner HTML between the tags.
    inner: &'a str,
}

impl HeadingMatch<'_> {
    fn existing_id(&self) -> Option<&str> {
        ID_ATTR_RE
            .captures(self.attrs)
            .map(|caps| caps.get(1).map(|m| m.as_str()).unwrap_or_default())
    }
}

/// Scan for h2/h3 elements in document order, non-overlapping, spanning
/// lines. An open tag without a matching close tag is skipped.
fn scan_headings(html: &str) -> Vec<HeadingMatch<'_>> {
    let mut matches = Vec::new();
    let mut pos = 0;

    while let Some(open) = OPEN_TAG_RE.find_at(html, pos) {
        let caps = OPEN_TAG_RE
            .captures(&html[open.start()..open.end()])
            .unwrap();
        let level: u8 = if &caps[1] == "2" { 2 } else { 3 };
        let close_tag = if level == 2 { "</h2>" } else { "</h3>" };

        let Some(close_rel) = html[open.end()..].find(close_tag) else {
            pos = open.end();
            continue;
        };
        let inner_end = open.end() + close_rel;
        let end = inner_end + close_tag.len();

        matches.push(HeadingMatch {
            start: open.start(),
            end,
            level,
            attrs: caps.get(2).map(|m| m.as_str()).unwrap_or_default(),
            inner: &html[open.end()..inner_end],
        });
        pos = end;
    }

    matches
}

/// Derive a URL-safe slug from heading text: lowercase, punctuation
/// removed, whitespace runs collapsed to hyphens.
fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned = NON_SLUG_RE.replace_all(&lowered, "");
    WHITESPACE_RE.replace_all(cleaned.trim(), "-").into_owned()
}

/// Extract h2/h3 headings for the table of contents.
///
/// Headings that already carry an id keep it verbatim. Derived ids are
/// deduplicated with a numeric suffix so two same-text headings get
/// distinct anchors.
pub fn extract_headings(html: &str) -> Vec<Heading> {
    let mut headings: Vec<Heading> = Vec::new();

    for m in scan_headings(html) {
        let text = TAG_RE.replace_all(m.inner, "").trim().to_string();

        let id = match m.existing_id() {
            Some(existing) => existing.to_string(),
            None => {
                let base = slugify(&text);
                let mut id = base.clone();
                let mut suffix = 1;
                while headings.iter().any(|h| h.id == id) {
                    id = format!("{base}-{suffix}");
                    suffix += 1;
                }
                id
            }
        };

        headings.push(Heading {
            level: m.level,
            id,
            text,
        });
    }

    headings
}

/// Add ids to h2/h3 elements that lack one.
///
/// Elements are paired positionally with `headings` (the output of
/// `extract_headings` over the same HTML). Elements that already have an
/// id, or that fall beyond the extracted list, are left untouched.
pub fn inject_ids(html: &str, headings: &[Heading]) -> String {
    let mut result = String::with_capacity(html.len());
    let mut last = 0;

    for (index, m) in scan_headings(html).iter().enumerate() {
        let Some(heading) = headings.get(index) else {
            break;
        };
        if m.existing_id().is_some() {
            continue;
        }

        result.push_str(&html[last..m.start]);
        result.push_str(&format!(
            "<h{level} id=\"{id}\"{attrs}>{inner}</h{level}>",
            level = m.level,
            id = heading.id,
            attrs = m.attrs,
            inner = m.inner,
        ));
        last = m.end;
    }
    result.push_str(&html[last..]);

    result
}

/// Render the table of contents navigation.
///
/// Returns an empty string for an empty heading list. Entries stay in
/// document order; level-3 entries are distinguished only by CSS class,
/// not nested sub-lists.
pub fn render_toc(headings: &[Heading]) -> String {
    if headings.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "<nav class=\"toc\" aria-label=\"Table of contents\">".to_string(),
        "<ul class=\"toc-list\">".to_string(),
    ];

    for heading in headings {
        let level_class = if heading.level == 2 { "toc-h2" } else { "toc-h3" };
        lines.push(format!(
            "<li class=\"{level_class}\"><a href=\"#{}\">{}</a></li>",
            heading.id, heading.text
        ));
    }

    lines.push("</ul>".to_string());
    lines.push("</nav>".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("Multi   Space"), "multi-space");
    }

    #[test]
    fn test_extract_basic() {
        let html = "<h2>First Section</h2><p>text</p><h3>Sub Section</h3>";
        let headings = extract_headings(html);

        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].level, 2);
        assert_eq!(headings[0].id, "first-section");
        assert_eq!(headings[0].text, "First Section");
        assert_eq!(headings[1].level, 3);
        assert_eq!(headings[1].id, "sub-section");
    }

    #[test]
    fn test_extract_strips_inner_tags() {
        let html = "<h2>With <em>emphasis</em> inside</h2>";
        let headings = extract_headings(html);

        assert_eq!(headings[0].text, "With emphasis inside");
        assert_eq!(headings[0].id, "with-emphasis-inside");
    }

    #[test]
    fn test_extract_keeps_existing_id() {
        let html = "<h2 id=\"custom-anchor\">Some Title</h2>";
        let headings = extract_headings(html);

        assert_eq!(headings[0].id, "custom-anchor");
    }

    #[test]
    fn test_extract_ignores_h1_and_h4() {
        let html = "<h1>Top</h1><h2>Kept</h2><h4>Deep</h4>";
        let headings = extract_headings(html);

        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "Kept");
    }

    #[test]
    fn test_extract_multiline_heading() {
        let html = "<h2>Spans\ntwo lines</h2>";
        let headings = extract_headings(html);

        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "Spans\ntwo lines");
    }

    #[test]
    fn test_duplicate_text_gets_suffixed_ids() {
        let html = "<h2>Notes</h2><h2>Notes</h2><h2>Notes</h2>";
        let headings = extract_headings(html);

        assert_eq!(headings[0].id, "notes");
        assert_eq!(headings[1].id, "notes-1");
        assert_eq!(headings[2].id, "notes-2");
    }

    #[test]
    fn test_inject_ids() {
        let html = "<h2>First</h2><p>x</p><h3>Second</h3>";
        let headings = extract_headings(html);
        let result = inject_ids(html, &headings);

        assert!(result.contains("<h2 id=\"first\">First</h2>"));
        assert!(result.contains("<h3 id=\"second\">Second</h3>"));
    }

    #[test]
    fn test_inject_leaves_existing_ids_alone() {
        let html = "<h2 id=\"keep-me\">Title</h2><h2>Other</h2>";
        let headings = extract_headings(html);
        let result = inject_ids(html, &headings);

        assert!(result.contains("<h2 id=\"keep-me\">Title</h2>"));
        assert!(result.contains("<h2 id=\"other\">Other</h2>"));
    }

    #[test]
    fn test_inject_preserves_other_attributes() {
        let html = "<h2 class=\"fancy\">Styled</h2>";
        let headings = extract_headings(html);
        let result = inject_ids(html, &headings);

        assert!(result.contains("<h2 id=\"styled\" class=\"fancy\">Styled</h2>"));
    }

    #[test]
    fn test_extract_inject_is_idempotent() {
        let html = "<h2>One</h2><h3>Two</h3><h2>Three</h2>";
        let first = inject_ids(html, &extract_headings(html));
        let second = inject_ids(&first, &extract_headings(&first));

        assert_eq!(first, second);
        assert_eq!(second.matches("id=\"one\"").count(), 1);
        assert_eq!(second.matches("id=\"two\"").count(), 1);
    }

    #[test]
    fn test_render_toc_empty() {
        assert_eq!(render_toc(&[]), "");
    }

    #[test]
    fn test_render_toc() {
        let headings = vec![
            Heading {
                level: 2,
                id: "intro".to_string(),
                text: "Intro".to_string(),
            },
            Heading {
                level: 3,
                id: "details".to_string(),
                text: "Details".to_string(),
            },
        ];
        let toc = render_toc(&headings);

        assert!(toc.contains("<nav class=\"toc\" aria-label=\"Table of contents\">"));
        assert!(toc.contains("<li class=\"toc-h2\"><a href=\"#intro\">Intro</a></li>"));
        assert!(toc.contains("<li class=\"toc-h3\"><a href=\"#details\">Details</a></li>"));
    }

    #[test]
    fn test_render_toc_keeps_document_order() {
        let headings = extract_headings("<h3>A</h3><h2>B</h2><h3>C</h3>");
        let toc = render_toc(&headings);

        let a = toc.find("#a").unwrap();
        let b = toc.find("#b").unwrap();
        let c = toc.find("#c").unwrap();
        assert!(a < b && b < c);
    }
}
