use std::path::PathBuf;

/// Why a slug could not be turned into a [`Document`](crate::Document).
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// No file backs the requested slug.
    #[error("no document for '{slug}' in collection '{collection}'")]
    NotFound { collection: String, slug: String },

    /// The backing file exists but could not be loaded.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}

impl ContentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}

/// Failure resolving a page request.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    UnknownCollection(#[from] crate::collection::UnknownCollection),

    #[error(transparent)]
    InvalidSlug(#[from] crate::slug::InvalidSlug),

    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Failure reading or parsing a single Markdown file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed front matter: {0}")]
    FrontMatter(String),

    #[error("invalid front matter field '{field}': {message}")]
    Schema { field: &'static str, message: String },
}

impl From<serde_yaml::Error> for LoadError {
    fn from(err: serde_yaml::Error) -> Self {
        LoadError::FrontMatter(err.to_string())
    }
}
