//! Tufte-style inline markup expansion.
//!
//! Rewrites the custom bracket syntax used in post bodies into Tufte CSS
//! markup, after markdown conversion:
//!
//! - `{sn}...{/sn}`: numbered sidenote
//! - `{mn}...{/mn}`: unnumbered margin note (circled-plus toggle)
//! - `{nt}...{/nt}`: small-caps "new thought" span
//!
//! Sidenotes and marginnotes share one counter, numbered in document
//! order, so a sidenote followed by a marginnote get consecutive ids
//! (`sn-1`, `mn-2`). The counter is scoped to a single call and never
//! leaks across documents. Captured content is trusted author HTML and
//! passes through verbatim.

use std::sync::LazyLock;

use regex::{Captures, Regex};

// One alternation so both note kinds are visited in document order.
// Group 1: sidenote content, group 2: marginnote content.
static NOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{sn\}(.*?)\{/sn\}|\{mn\}(.*?)\{/mn\}").unwrap());

static NEWTHOUGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{nt\}(.*?)\{/nt\}").unwrap());

/// Expand sidenote and marginnote syntax into toggle/checkbox/span triples.
pub fn expand_sidenotes(html: &str) -> String {
    let mut counter = 0usize;

    NOTE_RE
        .replace_all(html, |caps: &Captures| {
            counter += 1;
            if let Some(content) = caps.get(1) {
                let note_id = format!("sn-{counter}");
                format!(
                    "<label for=\"{note_id}\" class=\"margin-toggle sidenote-number\"></label>\
                     <input type=\"checkbox\" id=\"{note_id}\" class=\"margin-toggle\"/>\
                     <span class=\"sidenote\">{}</span>",
                    content.as_str()
                )
            } else {
                let note_id = format!("mn-{counter}");
                format!(
                    "<label for=\"{note_id}\" class=\"margin-toggle\">&#8853;</label>\
                     <input type=\"checkbox\" id=\"{note_id}\" class=\"margin-toggle\"/>\
                     <span class=\"marginnote\">{}</span>",
                    // Group 2 must be present when group 1 is not.
                    caps.get(2).map(|m| m.as_str()).unwrap_or_default()
                )
            }
        })
        .into_owned()
}

/// Expand `{nt}...{/nt}` into small-caps newthought spans.
pub fn expand_newthought(html: &str) -> String {
    NEWTHOUGHT_RE
        .replace_all(html, "<span class=\"newthought\">$1</span>")
        .into_owned()
}
