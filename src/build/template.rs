//! Minimal mustache-like template engine.
//!
//! Supports exactly two constructs:
//!
//! - `{{key}}`: variable substitution
//! - `{{#key}}...{{/key}}`: conditional (truthy scalar) or loop (list)
//!
//! Blocks are resolved before variable substitution, and the engine
//! recurses into block bodies, so blocks with different key names nest.
//! Keys absent from the context are left as literal `{{key}}` tokens so
//! template/context mismatches stay visible in the output. No HTML
//! escaping is performed anywhere; templates and values are trusted
//! author content.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("failed to read templates from {path}: {source}")]
    Load {
        path: String,
        source: std::io::Error,
    },
}

/// A template context value.
///
/// The three variants make the original's implicit truthiness explicit:
/// scalars substitute and gate conditionals, flags gate conditionals, and
/// lists drive loops with each element as the nested context.
#[derive(Debug, Clone)]
pub enum Value {
    Str(String),
    Bool(bool),
    List(Vec<Context>),
}

impl Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::List(items) => !items.is_empty(),
        }
    }

    /// String form for `{{key}}` substitution. Falsy values render empty.
    fn as_scalar(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Bool(true) => Some("true".to_string()),
            Value::Bool(false) => Some(String::new()),
            Value::List(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Context>> for Value {
    fn from(items: Vec<Context>) -> Self {
        Value::List(items)
    }
}

/// A template context: key/value mapping, read-only during rendering.
pub type Context = HashMap<String, Value>;

/// Render a template against a context.
pub fn render(template: &str, ctx: &Context) -> String {
    let resolved = render_blocks(template, ctx);
    substitute_variables(&resolved, ctx)
}

/// Resolve `{{#key}}...{{/key}}` blocks left to right, recursing into
/// each block body. A block whose close tag is missing is emitted as
/// literal text.
fn render_blocks(template: &str, ctx: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open_at) = rest.find("{{#") {
        let after_open = &rest[open_at + 3..];
        let Some((key, body_start)) = parse_block_key(after_open) else {
            // Not a well-formed open tag; keep the marker literal.
            out.push_str(&rest[..open_at + 3]);
            rest = after_open;
            continue;
        };

        let close_tag = format!("{{{{/{key}}}}}");
        let body = &after_open[body_start..];
        let Some(close_at) = body.find(&close_tag) else {
            // Unterminated block stays literal.
            let open_end = open_at + 3 + body_start;
            out.push_str(&rest[..open_end]);
            rest = &rest[open_end..];
            continue;
        };

        out.push_str(&rest[..open_at]);
        out.push_str(&render_block(&key, &body[..close_at], ctx));
        rest = &body[close_at + close_tag.len()..];
    }

    out.push_str(rest);
    out
}

/// Parse the key of an open tag: `name}}` -> ("name", offset past "}}").
/// Key names are word characters only.
fn parse_block_key(after_open: &str) -> Option<(String, usize)> {
    let end = after_open.find("}}")?;
    let key = &after_open[..end];
    if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some((key.to_string(), end + 2))
}

fn render_block(key: &str, inner: &str, ctx: &Context) -> String {
    match ctx.get(key) {
        Some(Value::List(items)) => items.iter().map(|item| render(inner, item)).collect(),
        Some(value) if value.is_truthy() => render(inner, ctx),
        _ => String::new(),
    }
}

static VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

/// Replace `{{key}}` tokens in one left-to-right pass over the content.
/// Keys the context does not know about are deliberately left alone, and
/// substituted values are never re-scanned, so a value that happens to
/// contain a `{{key}}` token passes through verbatim.
fn substitute_variables(content: &str, ctx: &Context) -> String {
    VAR_RE
        .replace_all(content, |caps: &Captures| {
            ctx.get(&caps[1])
                .and_then(|value| value.as_scalar())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Named templates preloaded from the templates directory.
pub struct TemplateStore {
    templates: HashMap<String, String>,
}

impl TemplateStore {
    /// Load every file in the templates directory, keyed by file name.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let mut templates = HashMap::new();
        let entries = std::fs::read_dir(dir).map_err(|source| TemplateError::Load {
            path: dir.display().to_string(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| TemplateError::Load {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let text = std::fs::read_to_string(&path).map_err(|source| TemplateError::Load {
                path: path.display().to_string(),
                source,
            })?;
            templates.insert(name, text);
        }

        Ok(Self { templates })
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            templates: pairs
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect(),
        }
    }

    /// Render a named template against a context.
    pub fn render(&self, name: &str, ctx: &Context) -> Result<String, TemplateError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        Ok(render(template, ctx))
    }
}
