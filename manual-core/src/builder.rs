use std::path::{Path, PathBuf};

use tera::Context;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::site::ContentSite;
use crate::template::{
    INDEX_TEMPLATE, NOT_FOUND_TEMPLATE, PAGE_TEMPLATE, TemplateError, TemplateRenderer,
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Content directory not specified")]
    MissingContentDir,
    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Asset copy error: {0}")]
    WalkError(#[from] walkdir::Error),
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}

/// What a build wrote.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub assets: usize,
    /// `collection/slug` of every enumerated page that failed to resolve.
    pub skipped: Vec<String>,
}

pub struct SiteBuilder {
    content_dir: Option<PathBuf>,
    output_dir: PathBuf,
    theme_dir: PathBuf,
    config: Config,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            content_dir: None,
            output_dir: PathBuf::from("./out"),
            theme_dir: PathBuf::from("./theme"),
            config: Config::default(),
        }
    }

    // Required configuration
    pub fn content_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.content_dir = Some(path.as_ref().to_path_buf());
        self
    }

    // Optional paths
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn theme_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.theme_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Site, BuildError> {
        let content_dir = self.content_dir.ok_or(BuildError::MissingContentDir)?;

        let mut config = self.config;
        config.content.root = content_dir;
        let content = ContentSite::from_config(&config);

        let mut renderer = TemplateRenderer::new(&self.theme_dir)?;
        renderer.add_to_context("site", &config.site);
        renderer.add_to_context("collections", &content.summaries());

        Ok(Site {
            content,
            renderer,
            output_dir: self.output_dir,
            theme_dir: self.theme_dir,
        })
    }
}

/// A configured build, ready to write pages.
pub struct Site {
    content: ContentSite,
    renderer: TemplateRenderer,
    output_dir: PathBuf,
    theme_dir: PathBuf,
}

impl Site {
    pub fn render_all(&self) -> Result<BuildReport, BuildError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let mut report = BuildReport::default();

        self.renderer.render_to_file_with_context(
            INDEX_TEMPLATE,
            &Context::new(),
            &self.output_dir.join("index.html"),
        )?;
        self.renderer.render_to_file_with_context(
            NOT_FOUND_TEMPLATE,
            &Context::new(),
            &self.output_dir.join("404.html"),
        )?;

        for collection in self.content.collections() {
            let name = collection.name();
            let root = self.output_dir.join(name);

            // Collection root serves the default document
            if let Some(page) = self.content.page::<&str>(name, &[]) {
                let mut context = Context::new();
                context.insert("page", &page);
                self.renderer.render_to_file_with_context(
                    PAGE_TEMPLATE,
                    &context,
                    &root.join("index.html"),
                )?;
                report.pages += 1;
            }

            for path in self.content.paths(name) {
                let slug = path.slug.joined();
                let Some(page) = self.content.page(name, path.slug.segments()) else {
                    warn!(collection = name, slug = %slug, "skipping page that failed to resolve");
                    report.skipped.push(format!("{name}/{slug}"));
                    continue;
                };

                let mut context = Context::new();
                context.insert("page", &page);
                self.renderer.render_to_file_with_context(
                    PAGE_TEMPLATE,
                    &context,
                    &root.join(&slug).join("index.html"),
                )?;
                report.pages += 1;
            }

            info!(collection = name, pages = report.pages, "collection rendered");
        }

        report.assets = self.copy_static_assets()?;
        Ok(report)
    }

    /// Copy `<theme>/static/**` to `<out>/static/`.
    fn copy_static_assets(&self) -> Result<usize, BuildError> {
        let source = self.theme_dir.join("static");
        if !source.is_dir() {
            return Ok(0);
        }

        let target = self.output_dir.join("static");
        let mut copied = 0;
        for entry in WalkDir::new(&source) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&source)
                .map_err(|_| BuildError::InvalidPath(entry.path().to_path_buf()))?;
            let destination = target.join(relative);
            if let Some(parent) = destination.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), destination)?;
            copied += 1;
        }

        Ok(copied)
    }
}

/// Render every enumerated page of every collection into `output_dir`.
pub fn build_site(
    config: &Config,
    content_dir: &Path,
    output_dir: &Path,
    theme_dir: &Path,
) -> Result<BuildReport, BuildError> {
    let site = SiteBuilder::new()
        .config(config.clone())
        .content_dir(content_dir)
        .output_dir(output_dir)
        .theme_dir(theme_dir)
        .build()?;

    let report = site.render_all()?;
    info!(
        pages = report.pages,
        skipped = report.skipped.len(),
        assets = report.assets,
        output = %output_dir.display(),
        "site built"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_content_dir() {
        assert!(matches!(
            SiteBuilder::new().build(),
            Err(BuildError::MissingContentDir)
        ));
    }

    #[test]
    fn test_build_writes_pages() {
        let content = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let theme = tempfile::tempdir().unwrap();

        let guides = content.path().join("guides");
        fs::create_dir_all(&guides).unwrap();
        fs::write(guides.join("index.md"), "---\ntitle: Guides\n---\nStart here\n").unwrap();
        fs::write(guides.join("setup.md"), "---\ndifficulty: beginner\n---\n# Setup\n").unwrap();
        fs::write(guides.join("broken.md"), "---\ndifficulty: wizard\n---\n").unwrap();

        fs::create_dir_all(theme.path().join("static").join("css")).unwrap();
        fs::write(theme.path().join("static").join("css").join("site.css"), "body{}").unwrap();

        let report = build_site(&Config::default(), content.path(), out.path(), theme.path()).unwrap();

        assert_eq!(report.pages, 3);
        assert_eq!(report.skipped, ["guides/broken"]);
        assert_eq!(report.assets, 1);

        let setup = fs::read_to_string(out.path().join("guides/setup/index.html")).unwrap();
        assert!(setup.contains("<h1>Guide</h1>"));
        assert!(setup.contains("Beginner"));
        assert!(out.path().join("guides/index.html").is_file());
        assert!(out.path().join("index.html").is_file());
        assert!(out.path().join("404.html").is_file());
        assert!(out.path().join("static/css/site.css").is_file());
        assert!(!out.path().join("docs").exists());
    }
}
