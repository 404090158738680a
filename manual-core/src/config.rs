use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Contents of `manual.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub content: ContentConfig,
    pub markdown: MarkdownConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub description: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "GitBook Manual".into(),
            description: Some("Documentation, guides and examples".to_string()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory holding `docs/`, `guides/` and `examples/`.
    pub root: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./content"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MarkdownConfig {
    /// syntect theme for fenced code blocks; unset leaves them plain.
    pub highlight_theme: Option<String>,
}
