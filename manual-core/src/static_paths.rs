use serde::Serialize;
use tracing::warn;

use crate::collection::Collection;
use crate::document::{Document, DocumentLoader};
use crate::error::ContentError;
use crate::slug::Slug;
use crate::store::CollectionStore;

/// Head metadata for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

impl PageMetadata {
    /// Metadata of a loaded document, filling gaps with the collection's
    /// literal defaults.
    pub fn from_document(collection: &Collection, document: &Document) -> Self {
        let fm = &document.front_matter;
        Self {
            title: fm
                .title()
                .unwrap_or(collection.labels.fallback_title)
                .to_string(),
            description: Some(
                fm.description()
                    .unwrap_or(collection.labels.default_description)
                    .to_string(),
            ),
            keywords: fm.tags.clone(),
        }
    }

    /// Metadata for a page that could not be resolved.
    pub fn not_found(collection: &Collection) -> Self {
        Self {
            title: collection.labels.not_found_title.to_string(),
            description: None,
            keywords: Vec::new(),
        }
    }
}

/// One page a build must pre-render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticPath {
    pub slug: Slug,
}

/// Everything a static build needs to know about one collection.
#[derive(Debug, Clone, Copy)]
pub struct StaticPathEnumerator<'a> {
    store: CollectionStore<'a>,
    loader: &'a DocumentLoader,
}

impl<'a> StaticPathEnumerator<'a> {
    pub fn new(collection: &'a Collection, loader: &'a DocumentLoader) -> Self {
        Self {
            store: CollectionStore::new(collection),
            loader,
        }
    }

    /// One single-segment slug per top-level Markdown file.
    ///
    /// Files in subdirectories are resolvable but never enumerated.
    pub fn enumerate_paths(&self) -> Vec<StaticPath> {
        self.store
            .list()
            .into_iter()
            .map(|slug| StaticPath {
                slug: Slug::single(slug),
            })
            .collect()
    }

    /// Metadata for `slug`. Never fails: unresolvable pages get the
    /// collection's not-found metadata.
    pub fn metadata_for(&self, slug: &Slug) -> PageMetadata {
        let collection = self.store.collection();
        match self.load(slug) {
            Ok(document) => PageMetadata::from_document(collection, &document),
            Err(e) => {
                if !e.is_not_found() {
                    warn!(collection = collection.name(), error = %e, "metadata fallback");
                }
                PageMetadata::not_found(collection)
            }
        }
    }

    fn load(&self, slug: &Slug) -> Result<Document, ContentError> {
        let path = self.store.resolve(slug)?;
        self.loader
            .load(self.store.collection(), slug, &path)
            .map_err(|source| ContentError::Load { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn collection_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Collection) {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("examples");
        fs::create_dir_all(dir.join("nested")).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        fs::write(dir.join("nested").join("deep.md"), "# Deep\n").unwrap();
        let examples = Collection::examples(root.path());
        (root, examples)
    }

    #[test]
    fn test_enumerate_counts_top_level_files() {
        let (_root, examples) = collection_with(&[
            ("index.md", "# Index\n"),
            ("chat.md", "# Chat\n"),
            ("README.txt", "ignored"),
        ]);
        let loader = DocumentLoader::default();
        let paths = StaticPathEnumerator::new(&examples, &loader).enumerate_paths();

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.slug.segments().len() == 1));
        assert!(!paths.iter().any(|p| p.slug.joined().contains("deep")));
    }

    #[test]
    fn test_enumerate_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let guides = Collection::guides(root.path());
        let loader = DocumentLoader::default();
        assert!(
            StaticPathEnumerator::new(&guides, &loader)
                .enumerate_paths()
                .is_empty()
        );
    }

    #[test]
    fn test_metadata_from_front_matter() {
        let (_root, examples) = collection_with(&[(
            "chat.md",
            "---\ntitle: Chat app\ndescription: Realtime chat\ntags: [ws, axum]\n---\nBody\n",
        )]);
        let loader = DocumentLoader::default();
        let meta = StaticPathEnumerator::new(&examples, &loader).metadata_for(&Slug::single("chat"));

        assert_eq!(
            meta,
            PageMetadata {
                title: "Chat app".to_string(),
                description: Some("Realtime chat".to_string()),
                keywords: vec!["ws".to_string(), "axum".to_string()],
            }
        );
    }

    #[test]
    fn test_metadata_defaults_when_title_missing() {
        let (_root, examples) = collection_with(&[("bare.md", "# No front matter\n")]);
        let loader = DocumentLoader::default();
        let meta = StaticPathEnumerator::new(&examples, &loader).metadata_for(&Slug::single("bare"));

        assert_eq!(meta.title, "Example");
        assert_eq!(meta.description.as_deref(), Some("GitBook Manual Example"));
        assert!(meta.keywords.is_empty());
    }

    #[test]
    fn test_metadata_for_missing_document() {
        let (_root, examples) = collection_with(&[]);
        let loader = DocumentLoader::default();
        let meta = StaticPathEnumerator::new(&examples, &loader)
            .metadata_for(&Slug::single("nonexistent"));

        assert_eq!(meta, PageMetadata::not_found(&examples));
        assert_eq!(meta.title, "Example Not Found");
        assert_eq!(meta.description, None);
    }

    #[test]
    fn test_metadata_for_unloadable_document() {
        let (_root, examples) = collection_with(&[("broken.md", "---\ncategory: exotic\n---\n")]);
        let loader = DocumentLoader::default();
        let meta =
            StaticPathEnumerator::new(&examples, &loader).metadata_for(&Slug::single("broken"));
        assert_eq!(meta.title, "Example Not Found");
    }
}
