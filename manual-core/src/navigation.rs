use serde::Serialize;
use tracing::debug;

use crate::collection::Collection;
use crate::slug::{self, Slug};
use crate::store::CollectionStore;

/// Previous and next documents around the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Siblings {
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// Link to a document of the same collection, labelled for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub slug: String,
    pub label: String,
    pub url: String,
    pub current: bool,
}

impl NavLink {
    pub fn new(collection: &Collection, slug: &str, current: bool) -> Self {
        Self {
            slug: slug.to_string(),
            label: slug::label(slug),
            url: format!("{}/{}", collection.url(), slug),
            current,
        }
    }
}

/// Navigation order of a collection.
///
/// The order is exactly what the directory listing returns. Front matter is
/// never consulted, so previous/next match the listing byte for byte.
#[derive(Debug, Clone, Copy)]
pub struct NavigationIndex<'a> {
    store: CollectionStore<'a>,
}

impl<'a> NavigationIndex<'a> {
    pub fn new(collection: &'a Collection) -> Self {
        Self {
            store: CollectionStore::new(collection),
        }
    }

    /// Neighbours of `current`; the empty slug stands for the default
    /// document.
    pub fn siblings(&self, current: &Slug) -> Siblings {
        self.siblings_from(&self.store.list(), current)
    }

    /// Same as [`siblings`](Self::siblings), against a listing the caller
    /// already holds.
    pub fn siblings_from(&self, listing: &[String], current: &Slug) -> Siblings {
        let collection = self.store.collection();
        let current = current.or_default(collection.default_slug);

        let found = siblings_in(listing, &current);
        if found.is_none() {
            debug!(
                collection = collection.name(),
                slug = %current,
                "slug not in collection listing, no siblings"
            );
        }
        found.unwrap_or_default()
    }
}

/// Neighbours of `current` in `listing`, or `None` when it is not listed.
fn siblings_in(listing: &[String], current: &str) -> Option<Siblings> {
    let index = listing.iter().position(|s| s == current)?;

    Some(Siblings {
        previous: index.checked_sub(1).map(|i| listing[i].clone()),
        next: listing.get(index + 1).cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn listing(slugs: &[&str]) -> Vec<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_middle_of_listing() {
        let slugs = listing(&["index", "setup", "deploy"]);
        assert_eq!(
            siblings_in(&slugs, "setup"),
            Some(Siblings {
                previous: Some("index".to_string()),
                next: Some("deploy".to_string()),
            })
        );
    }

    #[test]
    fn test_ends_of_listing() {
        let slugs = listing(&["index", "setup", "deploy"]);

        let first = siblings_in(&slugs, "index").unwrap();
        assert_eq!(first.previous, None);
        assert_eq!(first.next.as_deref(), Some("setup"));

        let last = siblings_in(&slugs, "deploy").unwrap();
        assert_eq!(last.previous.as_deref(), Some("setup"));
        assert_eq!(last.next, None);
    }

    #[test]
    fn test_single_entry() {
        let slugs = listing(&["only"]);
        assert_eq!(siblings_in(&slugs, "only"), Some(Siblings::default()));
    }

    #[test]
    fn test_unlisted_slug() {
        let slugs = listing(&["index", "setup"]);
        assert_eq!(siblings_in(&slugs, "api/auth"), None);
        assert_eq!(siblings_in(&[], "index"), None);
    }

    #[test]
    fn test_index_follows_directory_listing() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("guides");
        fs::create_dir_all(&dir).unwrap();
        for name in ["index", "setup", "deploy"] {
            fs::write(dir.join(format!("{name}.md")), "# Page\n").unwrap();
        }

        let guides = Collection::guides(root.path());
        let order = CollectionStore::new(&guides).list();
        let nav = NavigationIndex::new(&guides);

        let first = nav.siblings(&Slug::single(order[0].clone()));
        assert_eq!(first.previous, None);
        assert_eq!(first.next.as_ref(), Some(&order[1]));

        let last = nav.siblings(&Slug::single(order[2].clone()));
        assert_eq!(last.previous.as_ref(), Some(&order[1]));
        assert_eq!(last.next, None);

        assert_eq!(nav.siblings(&Slug::single("missing")), Siblings::default());
    }

    #[test]
    fn test_siblings_from_held_listing() {
        let guides = Collection::guides("content");
        let nav = NavigationIndex::new(&guides);
        let slugs = listing(&["index", "setup", "deploy"]);

        let setup = nav.siblings_from(&slugs, &Slug::single("setup"));
        assert_eq!(setup.previous.as_deref(), Some("index"));
        assert_eq!(setup.next.as_deref(), Some("deploy"));

        let root = nav.siblings_from(&slugs, &Slug::default());
        assert_eq!(root.previous, None);
        assert_eq!(root.next.as_deref(), Some("setup"));

        assert_eq!(nav.siblings_from(&slugs, &Slug::single("api")), Siblings::default());
    }

    #[test]
    fn test_empty_slug_means_default() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("guides");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.md"), "# Index\n").unwrap();

        let guides = Collection::guides(root.path());
        let nav = NavigationIndex::new(&guides);
        assert_eq!(nav.siblings(&Slug::default()), Siblings::default());
    }

    #[test]
    fn test_nav_link() {
        let guides = Collection::guides("content");
        let link = NavLink::new(&guides, "getting-started", true);
        assert_eq!(link.label, "Getting Started");
        assert_eq!(link.url, "/guides/getting-started");
        assert!(link.current);
    }
}
