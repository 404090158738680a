use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    TeraError(#[from] tera::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub const PAGE_TEMPLATE: &str = "page.html";
pub const INDEX_TEMPLATE: &str = "index.html";
pub const NOT_FOUND_TEMPLATE: &str = "404.html";

const BUILTIN: [(&str, &str); 4] = [
    (
        "base.html",
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{% block title %}{{ site.title }}{% endblock title %}</title>
{% block head %}{% endblock head %}
</head>
<body>
<header><a href="/">{{ site.title }}</a>{% for c in collections %} <a href="/{{ c.name }}">{{ c.section }}</a>{% endfor %}</header>
<main>{% block content %}{% endblock content %}</main>
</body>
</html>
"#,
    ),
    (
        "page.html",
        r#"{% extends "base.html" %}
{% block title %}{{ page.metadata.title }} | {{ site.title }}{% endblock title %}
{% block head %}{% if page.metadata.description %}<meta name="description" content="{{ page.metadata.description }}">{% endif %}
{% if page.metadata.keywords %}<meta name="keywords" content="{{ page.metadata.keywords | join(sep=", ") }}">{% endif %}{% endblock head %}
{% block content %}
<nav class="breadcrumbs">{% for crumb in page.breadcrumbs %}{% if not loop.first %} / {% endif %}{% if crumb.url %}<a href="{{ crumb.url }}">{{ crumb.label }}</a>{% else %}<span>{{ crumb.label }}</span>{% endif %}{% endfor %}</nav>
<header>
<h1>{{ page.metadata.title }}</h1>
{% if page.front_matter.description %}<p class="description">{{ page.front_matter.description }}</p>{% endif %}
{% if page.front_matter.updatedAt %}<p class="updated">Updated {{ page.front_matter.updatedAt }}</p>{% endif %}
{% if page.front_matter.difficulty %}<span class="badge difficulty-{{ page.front_matter.difficulty }}">{{ page.front_matter.difficulty | capitalize }}</span>{% endif %}
{% if page.front_matter.category %}<span class="badge category-{{ page.front_matter.category }}">{{ page.front_matter.category | capitalize }}</span>{% endif %}
{% if page.front_matter.demo %}<a class="demo" href="{{ page.front_matter.demo }}">Live Demo</a>{% endif %}
{% if page.front_matter.repository %}<a class="repository" href="{{ page.front_matter.repository }}">Source Code</a>{% endif %}
{% if page.front_matter.tags %}<ul class="tags">{% for tag in page.front_matter.tags %}<li>{{ tag }}</li>{% endfor %}</ul>{% endif %}
</header>
<article>{{ page.html | safe }}</article>
<nav class="siblings">
{% if page.previous %}<a rel="prev" href="{{ page.previous.url }}">Previous: {{ page.previous.label }}</a>{% endif %}
{% if page.next %}<a rel="next" href="{{ page.next.url }}">Next: {{ page.next.label }}</a>{% endif %}
</nav>
<aside><ul class="available">{% for link in page.available %}<li{% if link.current %} class="current"{% endif %}><a href="{{ link.url }}">{{ link.label }}</a></li>{% endfor %}</ul></aside>
{% endblock content %}
"#,
    ),
    (
        "index.html",
        r#"{% extends "base.html" %}
{% block content %}
<h1>{{ site.title }}</h1>
{% if site.description %}<p>{{ site.description }}</p>{% endif %}
<ul>{% for c in collections %}<li><a href="/{{ c.name }}">{{ c.section }}</a> ({{ c.count }})</li>{% endfor %}</ul>
{% endblock content %}
"#,
    ),
    (
        "404.html",
        r#"{% extends "base.html" %}
{% block title %}{{ title | default(value="Page Not Found") }} | {{ site.title }}{% endblock title %}
{% block content %}
<h1>{{ title | default(value="Page Not Found") }}</h1>
<p>The page you are looking for does not exist.</p>
{% endblock content %}
"#,
    ),
];

/// Tera templates: the built-in theme, overridden by name by any
/// `templates/**/*.html` found in a theme directory.
pub struct TemplateRenderer {
    tera: Tera,
    context: Context,
}

impl TemplateRenderer {
    pub fn builtin() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN)?;

        Ok(Self {
            tera,
            context: Context::new(),
        })
    }

    pub fn new<P: AsRef<Path>>(theme_dir: P) -> Result<Self, TemplateError> {
        let templates = theme_dir.as_ref().join("templates");
        if !templates.is_dir() {
            return Self::builtin();
        }

        let pattern = format!("{}/**/*.html", templates.display());
        let mut tera = Tera::new(&pattern)?;
        tera.extend(&Self::builtin()?.tera)?;

        Ok(Self {
            tera,
            context: Context::new(),
        })
    }

    /// Add a value to the context shared by every render
    pub fn add_to_context<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.context.insert(key, value);
    }

    /// Render a template with the shared context plus `extra`
    pub fn render_with_context(&self, template: &str, extra: &Context) -> Result<String, TemplateError> {
        let mut context = self.context.clone();
        context.extend(extra.clone());
        Ok(self.tera.render(template, &context)?)
    }

    /// Render a template and write it directly to a file
    pub fn render_to_file_with_context(
        &self,
        template: &str,
        extra: &Context,
        output_path: &Path,
    ) -> Result<(), TemplateError> {
        let rendered = self.render_with_context(template, extra)?;

        // Ensure parent directory exists
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(output_path, rendered)?;
        Ok(())
    }
}
