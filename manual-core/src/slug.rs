use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered URL path segments that identify a document inside a collection.
///
/// An empty slug addresses the collection's default document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(Vec<String>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slug segment '{0}'")]
pub struct InvalidSlug(pub String);

impl Slug {
    /// Build a slug from raw segments.
    ///
    /// Empty segments are dropped. Segments that could walk out of the
    /// collection directory (`.`, `..`, or anything containing a path
    /// separator) are rejected.
    pub fn new<I, S>(segments: I) -> Result<Self, InvalidSlug>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Vec::new();
        for segment in segments {
            let segment = segment.into();
            if segment.is_empty() {
                continue;
            }
            if segment == "." || segment == ".." || segment.contains(['/', '\\', '\0']) {
                return Err(InvalidSlug(segment));
            }
            out.push(segment);
        }
        Ok(Self(out))
    }

    /// Parse a `/`-separated path such as `getting-started/install`.
    pub fn parse(path: &str) -> Result<Self, InvalidSlug> {
        Self::new(path.split('/'))
    }

    /// A single-segment slug, as produced by collection listings.
    pub fn single<S: Into<String>>(segment: S) -> Self {
        Self(vec![segment.into()])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Segments joined with `/`.
    pub fn joined(&self) -> String {
        self.0.join("/")
    }

    /// Joined form, substituting `default` for the empty slug.
    pub fn or_default(&self, default: &str) -> String {
        if self.is_empty() {
            default.to_string()
        } else {
            self.joined()
        }
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Human label for a slug: dashes become spaces and every word is
/// capitalized, so `getting-started` reads "Getting Started".
pub fn label(slug: &str) -> String {
    slug.split('/')
        .last()
        .unwrap_or(slug)
        .split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joins_segments() {
        let slug = Slug::parse("api/auth").unwrap();
        assert_eq!(slug.segments(), ["api", "auth"]);
        assert_eq!(slug.joined(), "api/auth");
    }

    #[test]
    fn test_empty_slug_uses_default() {
        let slug = Slug::new(Vec::<String>::new()).unwrap();
        assert!(slug.is_empty());
        assert_eq!(slug.or_default("welcome"), "welcome");
        assert_eq!(Slug::parse("").unwrap(), slug);
    }

    #[test]
    fn test_rejects_traversal() {
        assert!(Slug::parse("../secrets").is_err());
        assert!(Slug::new(["docs", "."]).is_err());
        assert!(Slug::new(["a/b"]).is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(label("getting-started"), "Getting Started");
        assert_eq!(label("faq"), "Faq");
        assert_eq!(label("api/rate-limits"), "Rate Limits");
    }
}
