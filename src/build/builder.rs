//! Site assembly.
//!
//! Builds the whole site for every language:
//!
//! 1. Verify the templates and static directories, load templates
//! 2. Clear and recreate the output directory, copy static assets
//! 3. Pair content files across languages by slug
//! 4. Per language: build posts, the index page, standalone pages, and
//!    the Atom feed
//! 5. Write the root language-redirect page
//!
//! A document that fails to build is recorded and skipped; the rest of
//! the site still builds. Validation warnings are collected separately
//! and never affect the build result.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::SiteConfig;
use crate::i18n::{self, Lang};

use super::feed;
use super::frontmatter::{self, FrontmatterError};
use super::markdown::{RenderedBody, markdown_to_html};
use super::template::{Context, TemplateError, TemplateStore, Value};
use super::toc;

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("templates directory not found: {0}")]
    TemplatesNotFound(String),

    #[error("static directory not found: {0}")]
    StaticNotFound(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Metadata for one built post, consumed by the index page and the feed.
#[derive(Debug, Clone)]
pub struct PostMeta {
    pub title: String,
    /// `YYYY-MM-DD`, used for sorting and feed timestamps.
    pub published_date: String,
    pub published_date_formatted: String,
    pub updated_date: String,
    pub updated_date_formatted: String,
    pub was_updated: bool,
    pub excerpt: String,
    /// URL relative to the language root, e.g. `posts/hello.html`.
    pub url: String,
}

/// Outcome of a full site build.
pub struct BuildReport {
    pub posts: usize,
    pub pages: usize,
    pub languages: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl BuildReport {
    /// Warnings never flip the result; only errors do.
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Content files paired across languages by slug.
type ContentPairs = BTreeMap<String, Vec<(Lang, PathBuf)>>;

pub struct Builder {
    config: SiteConfig,
    /// Base path for resolving relative paths (typically the site root)
    base_path: PathBuf,
}

impl Builder {
    pub fn new(config: SiteConfig, base_path: PathBuf) -> Self {
        Self { config, base_path }
    }

    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let templates_dir = self.resolve(&self.config.paths.templates);
        if !templates_dir.exists() {
            return Err(BuildError::TemplatesNotFound(
                templates_dir.display().to_string(),
            ));
        }
        let static_dir = self.resolve(&self.config.paths.static_dir);
        if !static_dir.exists() {
            return Err(BuildError::StaticNotFound(static_dir.display().to_string()));
        }

        let templates = TemplateStore::load(&templates_dir)?;

        // Idempotent from a clean state: the output directory is fully
        // rebuilt on every run.
        let output_dir = self.resolve(&self.config.paths.output);
        if output_dir.exists() {
            std::fs::remove_dir_all(&output_dir)?;
        }
        std::fs::create_dir_all(&output_dir)?;

        copy_dir_all(&static_dir, &output_dir.join("static"))?;
        println!("  Copied: static/");

        let post_pairs = find_content_pairs(&self.resolve(&self.config.paths.posts));
        let page_pairs = find_content_pairs(&self.resolve(&self.config.paths.pages));

        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        let mut total_posts = 0;
        let mut total_pages = 0;

        for lang in Lang::ALL {
            println!("  [{}]", lang.code().to_uppercase());

            let mut posts: Vec<PostMeta> = Vec::new();
            for lang_paths in post_pairs.values() {
                let Some(md_path) = path_for(lang_paths, lang) else {
                    continue;
                };
                let has_alternate = path_for(lang_paths, lang.other()).is_some();
                match self.build_post(md_path, lang, has_alternate, &templates, &mut warnings) {
                    Ok(meta) => posts.push(meta),
                    Err(e) => {
                        errors.push(e.to_string());
                        println!("    Error: {e}");
                    }
                }
            }

            self.build_index(&posts, lang, &templates)?;
            total_posts += posts.len();

            // The about page is inlined on the homepage, not built standalone.
            for (slug, lang_paths) in &page_pairs {
                if slug == "about" {
                    continue;
                }
                let Some(md_path) = path_for(lang_paths, lang) else {
                    continue;
                };
                let has_alternate = path_for(lang_paths, lang.other()).is_some();
                match self.build_page(md_path, lang, has_alternate, &templates) {
                    Ok(()) => total_pages += 1,
                    Err(e) => {
                        errors.push(e.to_string());
                        println!("    Error: {e}");
                    }
                }
            }

            if !posts.is_empty() {
                self.build_feed(&posts, lang)?;
            }
        }

        self.build_root_redirect(&output_dir)?;

        // CNAME passthrough for custom-domain hosting.
        let cname = self.base_path.join("CNAME");
        if cname.exists() {
            std::fs::copy(&cname, output_dir.join("CNAME"))?;
            println!("  Copied: CNAME");
        }

        Ok(BuildReport {
            posts: total_posts,
            pages: total_pages,
            languages: Lang::ALL.len(),
            errors,
            warnings,
        })
    }

    /// Build a single post and return its metadata for the index and feed.
    fn build_post(
        &self,
        md_path: &Path,
        lang: Lang,
        has_alternate: bool,
        templates: &TemplateStore,
        warnings: &mut Vec<String>,
    ) -> Result<PostMeta, BuildError> {
        let content = read_source(md_path)?;
        let (fm, body) = frontmatter::parse(&content, Some(md_path))?;
        warnings.extend(frontmatter::validate(&fm, Some(md_path)));

        let stem = file_stem(md_path);
        let title = fm
            .get("title")
            .map(str::to_string)
            .unwrap_or_else(|| title_case(&stem));
        let subtitle = fm.get_or("subtitle", "").to_string();
        let excerpt = fm.get_or("excerpt", "").to_string();

        let updated_date = mtime_date(md_path)?;
        let published_date = fm
            .get("date")
            .filter(|d| !d.is_empty())
            .unwrap_or(&updated_date)
            .to_string();
        let was_updated = updated_date != published_date;

        let RenderedBody { html, headings } =
            markdown_to_html(&body, self.config.markdown.engine);
        let toc_html = toc::render_toc(&headings);
        let has_toc = headings.len() >= self.config.toc.min_headings;

        let strings = lang.strings();
        let other = lang.other();
        let output_name = format!("{stem}.html");

        let post_content = templates.render(
            "post.html",
            &Context::from([
                ("title".to_string(), Value::from(title.clone())),
                ("subtitle".to_string(), Value::from(subtitle)),
                (
                    "published_date".to_string(),
                    Value::from(i18n::format_date(&published_date, lang)),
                ),
                (
                    "updated_date".to_string(),
                    Value::from(if was_updated {
                        i18n::format_date(&updated_date, lang)
                    } else {
                        String::new()
                    }),
                ),
                ("was_updated".to_string(), Value::from(was_updated)),
                ("body".to_string(), Value::from(html)),
                ("toc".to_string(), Value::from(toc_html)),
                ("has_toc".to_string(), Value::from(has_toc)),
                ("root".to_string(), Value::from("../../")),
                (
                    "published_label".to_string(),
                    Value::from(strings.published_label),
                ),
                (
                    "updated_label".to_string(),
                    Value::from(strings.updated_label),
                ),
            ]),
        )?;

        let full_html = templates.render(
            "base.html",
            &self.base_context(
                &title,
                post_content,
                &excerpt,
                "article",
                "../../",
                lang,
                has_alternate,
                format!("../../{other}/posts/{output_name}"),
            ),
        )?;

        let output_path = self
            .resolve(&self.config.paths.output)
            .join(lang.code())
            .join("posts")
            .join(&output_name);
        write_output(&output_path, &full_html)?;
        self.report_built(&output_path);

        Ok(PostMeta {
            title,
            published_date_formatted: i18n::format_date(&published_date, lang),
            updated_date_formatted: i18n::format_date(&updated_date, lang),
            published_date,
            updated_date,
            was_updated,
            excerpt,
            url: format!("posts/{output_name}"),
        })
    }

    /// Build the index page for one language, newest-updated post first,
    /// with the about page body inlined.
    fn build_index(
        &self,
        posts: &[PostMeta],
        lang: Lang,
        templates: &TemplateStore,
    ) -> Result<(), BuildError> {
        let strings = lang.strings();
        let other = lang.other();

        let mut sorted: Vec<&PostMeta> = posts.iter().collect();
        sorted.sort_by(|a, b| b.updated_date.cmp(&a.updated_date));

        let post_items: Vec<Context> = sorted
            .iter()
            .map(|post| {
                Context::from([
                    ("title".to_string(), Value::from(post.title.clone())),
                    (
                        "published_date_formatted".to_string(),
                        Value::from(post.published_date_formatted.clone()),
                    ),
                    (
                        "updated_date_formatted".to_string(),
                        Value::from(post.updated_date_formatted.clone()),
                    ),
                    ("was_updated".to_string(), Value::from(post.was_updated)),
                    ("excerpt".to_string(), Value::from(post.excerpt.clone())),
                    ("url".to_string(), Value::from(post.url.clone())),
                    (
                        "updated_label".to_string(),
                        Value::from(strings.updated_label),
                    ),
                ])
            })
            .collect();

        let about_html = self.load_about_html(lang)?;

        let index_content = templates.render(
            "index.html",
            &Context::from([
                ("posts".to_string(), Value::from(post_items)),
                ("about_html".to_string(), Value::from(about_html)),
            ]),
        )?;

        let full_html = templates.render(
            "base.html",
            &self.base_context(
                "Home",
                index_content,
                &lang.site_description(&self.config.site.title),
                "website",
                "../",
                lang,
                true,
                format!("../{other}/index.html"),
            ),
        )?;

        let output_path = self
            .resolve(&self.config.paths.output)
            .join(lang.code())
            .join("index.html");
        write_output(&output_path, &full_html)?;
        self.report_built(&output_path);

        Ok(())
    }

    /// Build a standalone page. Pages are simpler than posts: no dates,
    /// no listing entry.
    fn build_page(
        &self,
        md_path: &Path,
        lang: Lang,
        has_alternate: bool,
        templates: &TemplateStore,
    ) -> Result<(), BuildError> {
        let content = read_source(md_path)?;
        let (fm, body) = frontmatter::parse(&content, Some(md_path))?;

        let stem = file_stem(md_path);
        let title = fm
            .get("title")
            .map(str::to_string)
            .unwrap_or_else(|| title_case(&stem));
        let subtitle = fm.get_or("subtitle", "").to_string();
        let description = fm
            .get("description")
            .or_else(|| fm.get("excerpt"))
            .unwrap_or("")
            .to_string();

        let RenderedBody { html, headings } =
            markdown_to_html(&body, self.config.markdown.engine);
        let toc_html = toc::render_toc(&headings);
        let has_toc = headings.len() >= self.config.toc.min_headings;

        let other = lang.other();
        let output_name = format!("{stem}.html");

        let page_content = templates.render(
            "page.html",
            &Context::from([
                ("title".to_string(), Value::from(title.clone())),
                ("subtitle".to_string(), Value::from(subtitle)),
                ("body".to_string(), Value::from(html)),
                ("toc".to_string(), Value::from(toc_html)),
                ("has_toc".to_string(), Value::from(has_toc)),
                ("root".to_string(), Value::from("../")),
            ]),
        )?;

        let full_html = templates.render(
            "base.html",
            &self.base_context(
                &title,
                page_content,
                &description,
                "website",
                "../",
                lang,
                has_alternate,
                format!("../{other}/{output_name}"),
            ),
        )?;

        let output_path = self
            .resolve(&self.config.paths.output)
            .join(lang.code())
            .join(&output_name);
        write_output(&output_path, &full_html)?;
        self.report_built(&output_path);

        Ok(())
    }

    fn build_feed(&self, posts: &[PostMeta], lang: Lang) -> Result<(), BuildError> {
        let xml = feed::render_feed(
            posts,
            lang,
            &self.config.site.title,
            &self.config.site.url,
            self.config.feed.limit,
        );

        let output_path = self
            .resolve(&self.config.paths.output)
            .join(lang.code())
            .join("feed.xml");
        write_output(&output_path, &xml)?;
        self.report_built(&output_path);

        Ok(())
    }

    /// Write the root index.html that redirects to the preferred
    /// language: stored preference first, then `navigator.language`,
    /// then the default.
    fn build_root_redirect(&self, output_dir: &Path) -> Result<(), BuildError> {
        let html = REDIRECT_TEMPLATE
            .replace("{site_url}", &self.config.site.url)
            .replace("{default_lang}", Lang::DEFAULT.code());

        let output_path = output_dir.join("index.html");
        std::fs::write(&output_path, html)?;
        self.report_built(&output_path);

        Ok(())
    }

    /// Load the rendered about page body for the homepage, empty when the
    /// page does not exist for this language.
    fn load_about_html(&self, lang: Lang) -> Result<String, BuildError> {
        let about_path = self
            .resolve(&self.config.paths.pages)
            .join(lang.code())
            .join("about.md");
        if !about_path.exists() {
            return Ok(String::new());
        }

        let content = read_source(&about_path)?;
        let (_, body) = frontmatter::parse(&content, Some(&about_path))?;
        Ok(markdown_to_html(&body, self.config.markdown.engine).html)
    }

    /// Shared context for the base (shell) template.
    #[allow(clippy::too_many_arguments)]
    fn base_context(
        &self,
        title: &str,
        content: String,
        description: &str,
        og_type: &str,
        root: &str,
        lang: Lang,
        has_alternate: bool,
        other_lang_url: String,
    ) -> Context {
        let other = lang.other();
        Context::from([
            ("title".to_string(), Value::from(title)),
            ("content".to_string(), Value::from(content)),
            ("description".to_string(), Value::from(description)),
            ("og_type".to_string(), Value::from(og_type)),
            ("root".to_string(), Value::from(root)),
            ("lang".to_string(), Value::from(lang.code())),
            ("other_lang".to_string(), Value::from(other.code())),
            ("has_alternate".to_string(), Value::from(has_alternate)),
            ("other_lang_url".to_string(), Value::from(other_lang_url)),
            ("lang_flag".to_string(), Value::from(other.flag_svg())),
            (
                "home_url".to_string(),
                Value::from(format!("{root}{}/index.html", lang.code())),
            ),
        ])
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_relative() {
            self.base_path.join(path)
        } else {
            path.to_path_buf()
        }
    }

    fn report_built(&self, output_path: &Path) {
        let display = output_path
            .strip_prefix(&self.base_path)
            .unwrap_or(output_path);
        println!("  Built: {}", display.display());
    }
}

const REDIRECT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <link rel="alternate" hreflang="en" href="{site_url}/en/index.html">
    <link rel="alternate" hreflang="pt" href="{site_url}/pt/index.html">
    <link rel="alternate" hreflang="x-default" href="{site_url}/{default_lang}/index.html">
    <script>
        (function() {
            var pref = localStorage.getItem('lang-preference');
            if (pref && (pref === 'en' || pref === 'pt')) {
                window.location.replace('/' + pref + '/index.html');
                return;
            }
            var lang = (navigator.language || '').toLowerCase();
            if (lang.startsWith('pt')) {
                window.location.replace('/pt/index.html');
            } else {
                window.location.replace('/{default_lang}/index.html');
            }
        })();
    </script>
    <meta http-equiv="refresh" content="0;url=/{default_lang}/index.html">
</head>
<body></body>
</html>"#;

/// Find content files across languages and pair them by slug.
fn find_content_pairs(content_dir: &Path) -> ContentPairs {
    let mut pairs = ContentPairs::new();

    for lang in Lang::ALL {
        let lang_dir = content_dir.join(lang.code());
        let Ok(entries) = std::fs::read_dir(&lang_dir) else {
            continue;
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("md"))
            .collect();
        files.sort();

        for md in files {
            let slug = file_stem(&md);
            pairs.entry(slug).or_default().push((lang, md));
        }
    }

    pairs
}

fn path_for(lang_paths: &[(Lang, PathBuf)], lang: Lang) -> Option<&Path> {
    lang_paths
        .iter()
        .find(|(l, _)| *l == lang)
        .map(|(_, p)| p.as_path())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}

fn read_source(path: &Path) -> Result<String, BuildError> {
    std::fs::read_to_string(path).map_err(|source| BuildError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn write_output(path: &Path, content: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// File modification time as a `YYYY-MM-DD` string.
fn mtime_date(path: &Path) -> Result<String, BuildError> {
    let mtime = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| BuildError::Read {
            path: path.display().to_string(),
            source,
        })?;
    Ok(DateTime::<Local>::from(mtime).format("%Y-%m-%d").to_string())
}

/// Recursively copy a directory.
fn copy_dir_all(src: &Path, dst: &Path) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Convert a filename slug to title case.
/// "getting-started" -> "Getting Started"
fn title_case(s: &str) -> String {
    s.split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("getting-started"), "Getting Started");
        assert_eq!(title_case("installation"), "Installation");
        assert_eq!(title_case("my_cool_post"), "My Cool Post");
    }

    #[test]
    fn test_path_for() {
        let paths = vec![
            (Lang::En, PathBuf::from("posts/en/hello.md")),
            (Lang::Pt, PathBuf::from("posts/pt/hello.md")),
        ];

        assert_eq!(
            path_for(&paths, Lang::Pt),
            Some(Path::new("posts/pt/hello.md"))
        );
        assert_eq!(path_for(&paths[..1], Lang::Pt), None);
    }

    #[test]
    fn test_toc_shown_only_at_heading_threshold() {
        let config = SiteConfig::default();

        // Two headings extract fine but stay under the display threshold.
        let two = toc::extract_headings("<h2>One</h2><h2>Two</h2>");
        assert_eq!(two.len(), 2);
        assert!(!toc::render_toc(&two).is_empty());
        assert!(two.len() < config.toc.min_headings);

        let three = toc::extract_headings("<h2>One</h2><h2>Two</h2><h3>Three</h3>");
        assert!(three.len() >= config.toc.min_headings);
    }

    #[test]
    fn test_redirect_template_substitution() {
        let html = REDIRECT_TEMPLATE
            .replace("{site_url}", "https://example.com")
            .replace("{default_lang}", "en");

        assert!(html.contains("href=\"https://example.com/en/index.html\""));
        assert!(html.contains("url=/en/index.html"));
        assert!(!html.contains("{site_url}"));
        assert!(!html.contains("{default_lang}"));
    }

    #[test]
    fn test_build_report_success_ignores_warnings() {
        let report = BuildReport {
            posts: 1,
            pages: 0,
            languages: 2,
            errors: vec![],
            warnings: vec!["post.md: missing 'title'".to_string()],
        };
        assert!(report.succeeded());

        let failed = BuildReport {
            posts: 0,
            pages: 0,
            languages: 2,
            errors: vec!["boom".to_string()],
            warnings: vec![],
        };
        assert!(!failed.succeeded());
    }
}
