pub mod builder;
pub mod collection;
pub mod config;
pub mod document;
pub mod error;
pub mod front_matter;
pub mod markdown;
pub mod navigation;
pub mod site;
pub mod slug;
pub mod static_paths;
pub mod store;
pub mod template;

// Re-export main types
pub use builder::{BuildError, BuildReport, SiteBuilder, build_site};
pub use collection::{Collection, CollectionKind, UnknownCollection};
pub use document::{Document, DocumentLoader};
pub use error::{ContentError, LoadError, PageError};
pub use front_matter::{Category, Difficulty, FrontMatter};
pub use markdown::{MarkdownRenderer, render_markdown};
pub use navigation::{NavLink, NavigationIndex, Siblings};
pub use site::{Breadcrumb, CollectionSummary, ContentSite, ResolvedPage};
pub use slug::Slug;
pub use static_paths::{PageMetadata, StaticPath, StaticPathEnumerator};
pub use store::CollectionStore;
pub use template::{TemplateError, TemplateRenderer};
