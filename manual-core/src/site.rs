use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::collection::{Collection, CollectionKind, UnknownCollection};
use crate::config::Config;
use crate::document::DocumentLoader;
use crate::error::{ContentError, PageError};
use crate::front_matter::FrontMatter;
use crate::markdown::MarkdownRenderer;
use crate::navigation::{NavLink, NavigationIndex};
use crate::slug::Slug;
use crate::static_paths::{PageMetadata, StaticPath, StaticPathEnumerator};
use crate::store::CollectionStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A page ready for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPage {
    pub collection: CollectionKind,
    /// Requested slug, with the default slug substituted for an empty one.
    pub slug: String,
    pub metadata: PageMetadata,
    pub front_matter: FrontMatter,
    pub html: String,
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
    /// Every document of the collection in navigation order.
    pub available: Vec<NavLink>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

/// Top-level navigation entry for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub name: &'static str,
    pub section: &'static str,
    pub count: usize,
}

/// The docs, guides and examples collections behind one content root.
#[derive(Debug, Clone)]
pub struct ContentSite {
    collections: Vec<Collection>,
    loader: DocumentLoader,
}

impl ContentSite {
    pub fn new<P: AsRef<Path>>(content_root: P) -> Self {
        let collections = CollectionKind::ALL
            .iter()
            .map(|kind| Collection::new(*kind, content_root.as_ref()))
            .collect();

        Self {
            collections,
            loader: DocumentLoader::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut markdown = MarkdownRenderer::new();
        if let Some(theme) = &config.markdown.highlight_theme {
            markdown = markdown.with_highlight_theme(theme.clone());
        }
        Self::new(&config.content.root).with_loader(DocumentLoader::new(markdown))
    }

    pub fn with_loader(mut self, loader: DocumentLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Result<&Collection, UnknownCollection> {
        let kind: CollectionKind = name.parse()?;
        self.collections
            .iter()
            .find(|c| c.kind == kind)
            .ok_or_else(|| UnknownCollection(name.to_string()))
    }

    pub fn summaries(&self) -> Vec<CollectionSummary> {
        self.collections
            .iter()
            .map(|c| CollectionSummary {
                name: c.name(),
                section: c.labels.section,
                count: CollectionStore::new(c).list().len(),
            })
            .collect()
    }

    /// Resolve a page request, keeping the reason for failure.
    pub fn resolve<S: AsRef<str>>(
        &self,
        collection: &str,
        segments: &[S],
    ) -> Result<ResolvedPage, PageError> {
        let collection = self.collection(collection)?;
        let slug = Slug::new(segments.iter().map(|s| s.as_ref()))?;

        let store = CollectionStore::new(collection);
        let path = store.resolve(&slug)?;
        let document = self
            .loader
            .load(collection, &slug, &path)
            .map_err(|source| ContentError::Load { path, source })?;

        let current = slug.or_default(collection.default_slug);
        let listing = store.list();
        let siblings = NavigationIndex::new(collection).siblings_from(&listing, &slug);

        let metadata = PageMetadata::from_document(collection, &document);
        let breadcrumbs = breadcrumbs(collection, &slug, document.front_matter.title());
        let available = listing
            .iter()
            .map(|s| NavLink::new(collection, s, *s == current))
            .collect();

        Ok(ResolvedPage {
            collection: collection.kind,
            slug: current,
            metadata,
            front_matter: document.front_matter,
            html: document.html,
            previous: siblings
                .previous
                .map(|s| NavLink::new(collection, &s, false)),
            next: siblings.next.map(|s| NavLink::new(collection, &s, false)),
            available,
            breadcrumbs,
        })
    }

    /// Resolve a page request; every failure reads as "not found".
    pub fn page<S: AsRef<str>>(&self, collection: &str, segments: &[S]) -> Option<ResolvedPage> {
        match self.resolve(collection, segments) {
            Ok(page) => Some(page),
            Err(PageError::Content(ContentError::Load { path, source })) => {
                warn!(path = %path.display(), error = %source, "document failed to load");
                None
            }
            Err(e) => {
                debug!(collection, error = %e, "page not found");
                None
            }
        }
    }

    /// Slugs to pre-render; empty for an unknown collection.
    pub fn paths(&self, collection: &str) -> Vec<StaticPath> {
        match self.collection(collection) {
            Ok(c) => StaticPathEnumerator::new(c, &self.loader).enumerate_paths(),
            Err(e) => {
                debug!(error = %e, "no paths");
                Vec::new()
            }
        }
    }

    /// Head metadata for a page. Unknown collections have none; anything
    /// else falls back to the collection's not-found metadata.
    pub fn metadata(&self, collection: &str, slug: &Slug) -> Option<PageMetadata> {
        let collection = self.collection(collection).ok()?;
        Some(StaticPathEnumerator::new(collection, &self.loader).metadata_for(slug))
    }
}

fn breadcrumbs(collection: &Collection, slug: &Slug, title: Option<&str>) -> Vec<Breadcrumb> {
    let mut crumbs = vec![
        Breadcrumb {
            label: "Home".to_string(),
            url: Some("/".to_string()),
        },
        Breadcrumb {
            label: collection.labels.section.to_string(),
            url: Some(collection.url()),
        },
    ];

    if !slug.is_empty() {
        crumbs.push(Breadcrumb {
            label: title.map(str::to_string).unwrap_or_else(|| slug.joined()),
            url: None,
        });
    }

    crumbs
}
