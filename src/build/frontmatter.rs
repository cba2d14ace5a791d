//! Frontmatter parsing and validation.
//!
//! Frontmatter is a `---`-delimited key/value block at the start of a
//! markdown source file:
//!
//! ```markdown
//! ---
//! title: My Post
//! date: 2026-01-10
//! ---
//!
//! Content here...
//! ```
//!
//! Parsing is strict (a malformed header fails the document); validation
//! is advisory and only collects warnings.

use std::path::Path;

use chrono::NaiveDate;

/// Date format expected in the `date` frontmatter field.
pub const DATE_FORMAT_INPUT: &str = "%Y-%m-%d";

const DELIMITER: &str = "---";

#[derive(thiserror::Error, Debug)]
pub enum FrontmatterError {
    #[error("malformed frontmatter{origin}: missing closing '---'")]
    MissingClosingDelimiter { origin: String },

    #[error("invalid frontmatter{origin} at line {line}: expected 'key: value', got '{text}'")]
    InvalidLine {
        origin: String,
        line: usize,
        text: String,
    },
}

/// Parsed frontmatter: an insertion-ordered key/value mapping.
///
/// Keys are free-form strings; values have surrounding whitespace trimmed
/// and one layer of matching surrounding quotes stripped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pairs: Vec<(String, String)>,
}

impl Frontmatter {
    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a value by key, falling back to a default.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    fn insert(&mut self, key: String, value: String) {
        if let Some(pair) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            pair.1 = value;
        } else {
            self.pairs.push((key, value));
        }
    }
}

/// Parse frontmatter from raw file content.
///
/// Returns the frontmatter mapping and the body (content after the closing
/// delimiter, trimmed). Content that does not start with `---` is returned
/// unchanged with an empty mapping.
///
/// `origin` is only used to locate errors in messages.
pub fn parse(
    content: &str,
    origin: Option<&Path>,
) -> Result<(Frontmatter, String), FrontmatterError> {
    let mut frontmatter = Frontmatter::default();

    if !content.starts_with(DELIMITER) {
        return Ok((frontmatter, content.to_string()));
    }

    let location = |path: Option<&Path>| {
        path.map(|p| format!(" in {}", p.display()))
            .unwrap_or_default()
    };

    let parts: Vec<&str> = content.splitn(3, DELIMITER).collect();
    if parts.len() < 3 {
        return Err(FrontmatterError::MissingClosingDelimiter {
            origin: location(origin),
        });
    }

    let header = parts[1].trim();
    let body = parts[2].trim().to_string();

    // Line numbers are 1-based and offset by the opening delimiter line.
    for (line_num, line) in header.lines().enumerate().map(|(i, l)| (i + 2, l)) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(FrontmatterError::InvalidLine {
                origin: location(origin),
                line: line_num,
                text: line.to_string(),
            });
        };
        frontmatter.insert(key.trim().to_string(), strip_quotes(value.trim()).to_string());
    }

    Ok((frontmatter, body))
}

/// Strip one layer of surrounding quotes when the same quote character is
/// present on both ends.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Validate frontmatter and return advisory warnings.
///
/// Warnings never block the build; missing recommended fields fall back to
/// defaults elsewhere (filename title, file mtime date, empty excerpt).
pub fn validate(frontmatter: &Frontmatter, origin: Option<&Path>) -> Vec<String> {
    let mut warnings = Vec::new();
    let location = origin
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "post".to_string());

    if !frontmatter.contains_key("title") {
        warnings.push(format!(
            "{location}: missing 'title' in frontmatter (using filename)"
        ));
    }

    if !frontmatter.contains_key("date") {
        warnings.push(format!(
            "{location}: missing 'date' in frontmatter (using file mtime)"
        ));
    }

    if !frontmatter.contains_key("excerpt") {
        warnings.push(format!(
            "{location}: missing 'excerpt' (index page will show no description)"
        ));
    }

    if let Some(date) = frontmatter.get("date") {
        if NaiveDate::parse_from_str(date, DATE_FORMAT_INPUT).is_err() {
            warnings.push(format!(
                "{location}: invalid date format '{date}' (expected YYYY-MM-DD)"
            ));
        }
    }

    warnings
}
