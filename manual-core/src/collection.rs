use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

/// The three content areas served by the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Docs,
    Guides,
    Examples,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Docs,
        CollectionKind::Guides,
        CollectionKind::Examples,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CollectionKind::Docs => "docs",
            CollectionKind::Guides => "guides",
            CollectionKind::Examples => "examples",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection '{0}'")]
pub struct UnknownCollection(pub String);

impl FromStr for CollectionKind {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "docs" => Ok(CollectionKind::Docs),
            "guides" => Ok(CollectionKind::Guides),
            "examples" => Ok(CollectionKind::Examples),
            other => Err(UnknownCollection(other.to_string())),
        }
    }
}

/// Literal strings a collection falls back to when front matter is silent
/// or a document cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionLabels {
    /// Page title when front matter has no `title`.
    pub fallback_title: &'static str,
    /// Page title when the document could not be resolved.
    pub not_found_title: &'static str,
    /// Description when front matter has no `description`.
    pub default_description: &'static str,
    /// Name of the collection in breadcrumbs.
    pub section: &'static str,
}

/// A named content area backed by one flat directory of Markdown files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub kind: CollectionKind,
    pub directory: PathBuf,
    /// Served when a request carries no slug.
    pub default_slug: &'static str,
    /// Probe `<dir>/<slug>` when `<dir>/<slug>.md` is missing.
    pub extensionless_fallback: bool,
    pub labels: CollectionLabels,
}

impl Collection {
    /// Build the configuration for `kind` rooted at `<content_root>/<kind>`.
    pub fn new<P: AsRef<Path>>(kind: CollectionKind, content_root: P) -> Self {
        let directory = content_root.as_ref().join(kind.name());

        match kind {
            CollectionKind::Docs => Self {
                kind,
                directory,
                default_slug: "welcome",
                extensionless_fallback: true,
                labels: CollectionLabels {
                    fallback_title: "Documentation",
                    not_found_title: "Document Not Found",
                    default_description: "GitBook Manual Documentation",
                    section: "Documentation",
                },
            },
            CollectionKind::Guides => Self {
                kind,
                directory,
                default_slug: "index",
                extensionless_fallback: false,
                labels: CollectionLabels {
                    fallback_title: "Guide",
                    not_found_title: "Guide Not Found",
                    default_description: "GitBook Manual Guide",
                    section: "Guides",
                },
            },
            CollectionKind::Examples => Self {
                kind,
                directory,
                default_slug: "index",
                extensionless_fallback: false,
                labels: CollectionLabels {
                    fallback_title: "Example",
                    not_found_title: "Example Not Found",
                    default_description: "GitBook Manual Example",
                    section: "Examples",
                },
            },
        }
    }

    pub fn docs<P: AsRef<Path>>(content_root: P) -> Self {
        Self::new(CollectionKind::Docs, content_root)
    }

    pub fn guides<P: AsRef<Path>>(content_root: P) -> Self {
        Self::new(CollectionKind::Guides, content_root)
    }

    pub fn examples<P: AsRef<Path>>(content_root: P) -> Self {
        Self::new(CollectionKind::Examples, content_root)
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// URL path of the collection root, e.g. `/guides`.
    pub fn url(&self) -> String {
        format!("/{}", self.name())
    }
}
