use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::collection::Collection;
use crate::error::LoadError;
use crate::front_matter::{self, FrontMatter};
use crate::markdown::MarkdownRenderer;
use crate::slug::Slug;

/// One addressable page, recomputed from disk on every load.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub slug: Slug,
    #[serde(skip)]
    pub path: PathBuf,
    pub front_matter: FrontMatter,
    /// Front matter block exactly as written, fences included.
    #[serde(skip)]
    pub raw_front_matter: String,
    /// Markdown with the front matter removed.
    pub body: String,
    pub html: String,
}

impl Document {
    /// The original file contents.
    pub fn source(&self) -> String {
        format!("{}{}", self.raw_front_matter, self.body)
    }
}

/// Reads Markdown files and turns them into [`Document`]s.
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    markdown: MarkdownRenderer,
}

impl DocumentLoader {
    pub fn new(markdown: MarkdownRenderer) -> Self {
        Self { markdown }
    }

    pub fn load(
        &self,
        collection: &Collection,
        slug: &Slug,
        path: &Path,
    ) -> Result<Document, LoadError> {
        let content = std::fs::read_to_string(path)?;
        self.parse(collection, slug, path, &content)
    }

    /// Build a document from text already in memory.
    pub fn parse(
        &self,
        collection: &Collection,
        slug: &Slug,
        path: &Path,
        content: &str,
    ) -> Result<Document, LoadError> {
        let parts = front_matter::split(content)?;
        let front_matter = FrontMatter::parse(parts.yaml, collection.kind)?;
        let html = self.markdown.render(parts.body);

        Ok(Document {
            slug: slug.clone(),
            path: path.to_path_buf(),
            front_matter,
            raw_front_matter: parts.block.to_string(),
            body: parts.body.to_string(),
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.md");
        let content = "---\ntitle: Setup\ndescription: Get going\n---\n# Setup\n\n| a |\n|---|\n| 1 |\n";
        fs::write(&path, content).unwrap();

        let guides = Collection::guides(dir.path());
        let doc = DocumentLoader::default()
            .load(&guides, &Slug::single("setup"), &path)
            .unwrap();

        assert_eq!(doc.front_matter.title.as_deref(), Some("Setup"));
        assert_eq!(doc.front_matter.description.as_deref(), Some("Get going"));
        assert_eq!(doc.body, "# Setup\n\n| a |\n|---|\n| 1 |\n");
        assert!(doc.html.contains("<h1>Setup</h1>"));
        assert!(doc.html.contains("<table>"));
        assert_eq!(doc.source(), content);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let docs = Collection::docs(dir.path());
        let err = DocumentLoader::default()
            .load(&docs, &Slug::single("gone"), &dir.path().join("gone.md"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_load_malformed_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.md");
        fs::write(&path, "---\ntitle: [broken\n---\nbody\n").unwrap();

        let docs = Collection::docs(dir.path());
        let err = DocumentLoader::default()
            .load(&docs, &Slug::single("bad"), &path)
            .unwrap_err();
        assert!(matches!(err, LoadError::FrontMatter(_)));
    }

    #[test]
    fn test_source_round_trip_without_front_matter() {
        let docs = Collection::docs(".");
        let content = "Plain *markdown* only.\n";
        let doc = DocumentLoader::default()
            .parse(&docs, &Slug::single("plain"), Path::new("plain.md"), content)
            .unwrap();
        assert_eq!(doc.raw_front_matter, "");
        assert_eq!(doc.source(), content);
        assert_eq!(doc.front_matter, FrontMatter::default());
    }
}
