//! Site configuration.
//!
//! Loaded from an optional `marginalia.yaml` next to the content
//! directories. Every field has a default, and a missing config file is
//! not an error: a bare checkout with `posts/`, `pages/`, `templates/`
//! and `static/` builds with no configuration at all.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::build::markdown::MarkdownEngine;

pub const DEFAULT_CONFIG_FILE: &str = "marginalia.yaml";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),
}

/// Top-level site configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteMeta,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub toc: TocConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteMeta {
    #[serde(default = "default_site_title")]
    pub title: String,
    #[serde(default = "default_site_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default = "default_posts_dir")]
    pub posts: PathBuf,
    #[serde(default = "default_pages_dir")]
    pub pages: PathBuf,
    #[serde(default = "default_templates_dir")]
    pub templates: PathBuf,
    #[serde(default = "default_static_dir", rename = "static")]
    pub static_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkdownConfig {
    #[serde(default)]
    pub engine: MarkdownEngine,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TocConfig {
    /// Minimum number of headings required to show the table of contents.
    #[serde(default = "default_min_headings")]
    pub min_headings: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Maximum number of entries in the Atom feed.
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
}

fn default_site_title() -> String {
    "My Site".to_string()
}

fn default_site_url() -> String {
    "https://example.com".to_string()
}

fn default_posts_dir() -> PathBuf {
    "posts".into()
}

fn default_pages_dir() -> PathBuf {
    "pages".into()
}

fn default_templates_dir() -> PathBuf {
    "templates".into()
}

fn default_static_dir() -> PathBuf {
    "static".into()
}

fn default_output_dir() -> PathBuf {
    "output".into()
}

fn default_min_headings() -> usize {
    3
}

fn default_feed_limit() -> usize {
    20
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            url: default_site_url(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            posts: default_posts_dir(),
            pages: default_pages_dir(),
            templates: default_templates_dir(),
            static_dir: default_static_dir(),
            output: default_output_dir(),
        }
    }
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            min_headings: default_min_headings(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            limit: default_feed_limit(),
        }
    }
}

impl SiteConfig {
    /// Load the config from the command line argument, defaulting to
    /// `marginalia.yaml`. A missing default config file yields the full
    /// default configuration; an explicitly named file must exist.
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = config_file.is_some();
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        if !explicit && !config_file.exists() {
            return Ok(Self::default());
        }

        Self::load_from_file(&config_file)
    }

    pub(crate) fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Ok(serde_yaml::from_str(&content)?)
    }
}
