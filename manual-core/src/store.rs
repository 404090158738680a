use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::collection::Collection;
use crate::error::ContentError;
use crate::slug::Slug;

const EXTENSION: &str = ".md";

/// Filesystem view of one collection: listing and slug resolution.
///
/// Nothing is cached, every call reads the directory again.
#[derive(Debug, Clone, Copy)]
pub struct CollectionStore<'a> {
    collection: &'a Collection,
}

impl<'a> CollectionStore<'a> {
    pub fn new(collection: &'a Collection) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &'a Collection {
        self.collection
    }

    /// Map a slug to the file backing it.
    ///
    /// The empty slug resolves to the collection's default slug.
    pub fn resolve(&self, slug: &Slug) -> Result<PathBuf, ContentError> {
        let joined = slug.or_default(self.collection.default_slug);
        let path = self
            .collection
            .directory
            .join(format!("{joined}{EXTENSION}"));

        if path.is_file() {
            return Ok(path);
        }

        if self.collection.extensionless_fallback {
            let alternate = self.collection.directory.join(&joined);
            if alternate.is_file() {
                debug!(
                    collection = self.collection.name(),
                    path = %alternate.display(),
                    "resolved slug via extension-less path"
                );
                return Ok(alternate);
            }
        }

        Err(ContentError::NotFound {
            collection: self.collection.name().to_string(),
            slug: joined,
        })
    }

    /// Slugs of the Markdown files directly inside the collection directory,
    /// in the order the filesystem lists them.
    ///
    /// A missing directory yields an empty listing.
    pub fn list(&self) -> Vec<String> {
        match scan_directory(&self.collection.directory) {
            Ok(slugs) => slugs,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    collection = self.collection.name(),
                    directory = %self.collection.directory.display(),
                    "collection directory missing"
                );
                Vec::new()
            }
            Err(e) => {
                warn!(
                    collection = self.collection.name(),
                    directory = %self.collection.directory.display(),
                    error = %e,
                    "failed to list collection"
                );
                Vec::new()
            }
        }
    }
}

fn scan_directory(dir: &Path) -> io::Result<Vec<String>> {
    let mut slugs = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        // Only markdown files in the collection root
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(stem) = name.strip_suffix(EXTENSION) {
            slugs.push(stem.to_string());
        }
    }

    Ok(slugs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn content_root() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let docs = root.path().join("docs");
        fs::create_dir_all(docs.join("api")).unwrap();
        fs::write(docs.join("welcome.md"), "# Welcome\n").unwrap();
        fs::write(docs.join("install.md"), "# Install\n").unwrap();
        fs::write(docs.join("notes.txt"), "not markdown").unwrap();
        fs::write(docs.join("api").join("auth.md"), "# Auth\n").unwrap();
        fs::write(docs.join("raw"), "# Raw\n").unwrap();
        root
    }

    #[test]
    fn test_list_is_flat_and_filtered() {
        let root = content_root();
        let docs = Collection::docs(root.path());

        let mut slugs = CollectionStore::new(&docs).list();
        slugs.sort();
        assert_eq!(slugs, ["install", "welcome"]);
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let guides = Collection::guides(root.path());
        assert!(CollectionStore::new(&guides).list().is_empty());
    }

    #[test]
    fn test_resolve_default_slug() {
        let root = content_root();
        let docs = Collection::docs(root.path());

        let path = CollectionStore::new(&docs).resolve(&Slug::default()).unwrap();
        assert_eq!(path, root.path().join("docs").join("welcome.md"));
    }

    #[test]
    fn test_resolve_nested_slug() {
        let root = content_root();
        let docs = Collection::docs(root.path());

        let path = CollectionStore::new(&docs)
            .resolve(&Slug::parse("api/auth").unwrap())
            .unwrap();
        assert_eq!(path, root.path().join("docs").join("api").join("auth.md"));
    }

    #[test]
    fn test_resolve_missing_is_not_found() {
        let root = content_root();
        let docs = Collection::docs(root.path());

        let err = CollectionStore::new(&docs)
            .resolve(&Slug::single("nonexistent"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_extensionless_fallback_only_for_docs() {
        let root = content_root();
        let docs = Collection::docs(root.path());
        let path = CollectionStore::new(&docs)
            .resolve(&Slug::single("raw"))
            .unwrap();
        assert_eq!(path, root.path().join("docs").join("raw"));

        fs::create_dir_all(root.path().join("guides")).unwrap();
        fs::write(root.path().join("guides").join("raw"), "# Raw\n").unwrap();
        let guides = Collection::guides(root.path());
        assert!(CollectionStore::new(&guides)
            .resolve(&Slug::single("raw"))
            .is_err());
    }

    #[test]
    fn test_every_listed_slug_resolves() {
        let root = content_root();
        let docs = Collection::docs(root.path());
        let store = CollectionStore::new(&docs);

        for slug in store.list() {
            assert!(store.resolve(&Slug::single(slug)).is_ok());
        }
    }
}
