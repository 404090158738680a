use std::sync::LazyLock;

use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream, html,
};
use regex::Regex;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use tracing::warn;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

static AUTOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<url>(?:https?://|www\.)[^\s<>]+)|(?P<email>[a-z0-9._+-]+@[a-z0-9_-]+(?:\.[a-z0-9_-]+)+)",
    )
    .expect("autolink pattern is valid")
});

/// Markdown to HTML conversion.
///
/// CommonMark plus the GitHub extensions: tables, strikethrough, task lists,
/// footnotes and bare URL and email autolinks. Raw HTML in the source is emitted
/// untouched; content is written by trusted authors and is never sanitized.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    highlight_theme: Option<String>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight fenced code blocks with the named syntect theme
    /// (e.g. `base16-ocean.dark`).
    pub fn with_highlight_theme<S: Into<String>>(mut self, theme: S) -> Self {
        self.highlight_theme = Some(theme.into());
        self
    }

    pub fn render(&self, markdown: &str) -> String {
        let parser = TextMergeStream::new(Parser::new_ext(markdown, options()));
        let mut events = autolink(parser);

        if let Some(theme) = self.theme() {
            events = highlight(events, theme);
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    fn theme(&self) -> Option<&'static Theme> {
        let name = self.highlight_theme.as_deref()?;
        let theme = THEME_SET.themes.get(name);
        if theme.is_none() {
            warn!(theme = name, "unknown highlight theme, code blocks left plain");
        }
        theme
    }
}

/// Render with the default renderer.
pub fn render_markdown(markdown: &str) -> String {
    MarkdownRenderer::new().render(markdown)
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Turn bare URLs and email addresses in plain text into links, leaving code, existing links,
/// image alt text and raw `<a>` elements alone.
fn autolink<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut link_depth = 0usize;
    let mut html_anchor_depth = 0usize;
    let mut in_code_block = false;

    for event in events {
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => link_depth += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => {
                link_depth = link_depth.saturating_sub(1);
            }
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::InlineHtml(tag) => {
                let tag = tag.trim_start().to_ascii_lowercase();
                if tag.starts_with("</a") {
                    html_anchor_depth = html_anchor_depth.saturating_sub(1);
                } else if tag.starts_with("<a ") || tag.starts_with("<a>") {
                    html_anchor_depth += 1;
                }
            }
            Event::Text(text) if link_depth == 0 && html_anchor_depth == 0 && !in_code_block => {
                push_autolinked(text, &mut out);
                continue;
            }
            _ => {}
        }
        out.push(event);
    }

    out
}

fn push_autolinked<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut last = 0;

    for caps in AUTOLINK.captures_iter(text) {
        let Some(found) = caps.get(0) else {
            continue;
        };
        if !at_word_start(text, found.start()) {
            continue;
        }

        let (shown, dest) = if caps.name("email").is_some() {
            let Some(address) = trim_email(found.as_str()) else {
                continue;
            };
            (address, format!("mailto:{address}"))
        } else {
            let url = trim_url(found.as_str());
            if url.len() <= 4 || url.ends_with("://") {
                continue;
            }
            let dest = if url.to_ascii_lowercase().starts_with("www.") {
                format!("http://{url}")
            } else {
                url.to_string()
            };
            (url, dest)
        };

        if found.start() > last {
            out.push(Event::Text(CowStr::from(text[last..found.start()].to_string())));
        }
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(dest),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(CowStr::from(shown.to_string())));
        out.push(Event::End(TagEnd::Link));

        last = found.start() + shown.len();
    }

    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// An address ending in `-` or `_` is not a link; a trailing `.` ends the
/// sentence.
fn trim_email(address: &str) -> Option<&str> {
    let address = address.trim_end_matches('.');
    if address.ends_with(['-', '_']) {
        return None;
    }
    let (_, domain) = address.split_once('@')?;
    domain.contains('.').then_some(address)
}

fn at_word_start(text: &str, start: usize) -> bool {
    match text[..start].chars().next_back() {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '*' | '_' | '~' | '('),
    }
}

/// Drop trailing punctuation that belongs to the sentence, not the URL.
fn trim_url(url: &str) -> &str {
    let mut end = url.len();
    loop {
        let candidate = &url[..end];
        let Some(last) = candidate.chars().next_back() else {
            break;
        };
        let strip = match last {
            '?' | '!' | '.' | ',' | ':' | '*' | '_' | '~' | '\'' | '"' | ';' => true,
            ')' => candidate.matches(')').count() > candidate.matches('(').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }
    &url[..end]
}

fn highlight<'a>(events: Vec<Event<'a>>, theme: &Theme) -> Vec<Event<'a>> {
    let mut processed = Vec::with_capacity(events.len());
    let mut events = events.into_iter();

    while let Some(event) = events.next() {
        let Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) = &event else {
            processed.push(event);
            continue;
        };

        // Collect all text events until the end of the code block
        let lang = lang.to_string();
        let mut code = String::new();
        for inner in events.by_ref() {
            match inner {
                Event::End(TagEnd::CodeBlock) => break,
                Event::Text(text) => code.push_str(&text),
                _ => {}
            }
        }

        let syntax = SYNTAX_SET.find_syntax_by_token(&lang).or_else(|| {
            // Fallback mappings for unsupported languages
            match lang.as_str() {
                "nix" => SYNTAX_SET.find_syntax_by_name("JavaScript"),
                "toml" => SYNTAX_SET.find_syntax_by_name("YAML"),
                _ => None,
            }
        });

        let plain = || format!("<pre><code>{}</code></pre>\n", html_escape::encode_text(&code));
        let rendered = match syntax {
            Some(syntax) => highlighted_html_for_string(&code, &SYNTAX_SET, syntax, theme)
                .unwrap_or_else(|_| plain()),
            None => plain(),
        };

        processed.push(Event::Html(CowStr::from(rendered)));
    }

    processed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gfm_table() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>a</th>"));
        assert!(html.contains("<td>2</td>"));
    }

    #[test]
    fn test_strikethrough() {
        let html = render_markdown("~~gone~~");
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let html = render_markdown("<div class=\"note\"><script>track()</script></div>\n\nText <kbd>Ctrl</kbd>\n");
        assert!(html.contains("<div class=\"note\"><script>track()</script></div>"));
        assert!(html.contains("<kbd>Ctrl</kbd>"));
    }

    #[test]
    fn test_bare_url_autolinked() {
        let html = render_markdown("See https://example.com/docs.");
        assert!(html.contains(r#"<a href="https://example.com/docs">https://example.com/docs</a>."#));
    }

    #[test]
    fn test_www_autolink_gets_scheme() {
        let html = render_markdown("Visit www.rust-lang.org today");
        assert!(html.contains(r#"<a href="http://www.rust-lang.org">www.rust-lang.org</a>"#));
    }

    #[test]
    fn test_email_autolinked() {
        let html = render_markdown("Mail support@example.com today.");
        assert!(html.contains(
            r#"<a href="mailto:support@example.com">support@example.com</a> today."#
        ));

        let html = render_markdown("Write to team.docs+manual@mail.example.org.");
        assert!(html.contains(r#"href="mailto:team.docs+manual@mail.example.org">"#));
        assert!(html.contains("</a>.</p>"));
    }

    #[test]
    fn test_email_not_autolinked_in_code_or_links() {
        let html = render_markdown("`ops@example.com` and [ops@example.com](/contact)\n\n```\nops@example.com\n```\n");
        assert!(!html.contains("mailto:"));
    }

    #[test]
    fn test_trim_email() {
        assert_eq!(trim_email("a@b.io."), Some("a@b.io"));
        assert_eq!(trim_email("a@b.io-"), None);
        assert_eq!(trim_email("a@b."), None);
    }

    #[test]
    fn test_autolink_keeps_balanced_parens() {
        let html = render_markdown("(see https://en.wikipedia.org/wiki/Rust_(language))");
        assert!(html.contains(r#"href="https://en.wikipedia.org/wiki/Rust_(language)""#));
    }

    #[test]
    fn test_no_autolink_in_code_or_links() {
        let html = render_markdown("`https://a.example` and [https://b.example](https://c.example)\n\n```\nhttps://d.example\n```\n");
        assert!(!html.contains(r#"href="https://a.example""#));
        assert!(!html.contains(r#"href="https://b.example""#));
        assert!(!html.contains(r#"href="https://d.example""#));
        assert!(html.contains(r#"href="https://c.example""#));
    }

    #[test]
    fn test_plain_code_block_without_theme() {
        let html = render_markdown("```rust\nfn main() {}\n```\n");
        assert!(html.contains(r#"<pre><code class="language-rust">"#));
    }

    #[test]
    fn test_highlighted_code_block() {
        let html = MarkdownRenderer::new()
            .with_highlight_theme("base16-ocean.dark")
            .render("```rust\nfn main() {}\n```\n");
        assert!(html.contains("<pre style="));
        assert!(!html.contains("language-rust"));
    }

    #[test]
    fn test_unknown_theme_falls_back_to_plain() {
        let html = MarkdownRenderer::new()
            .with_highlight_theme("no-such-theme")
            .render("```rust\nfn main() {}\n```\n");
        assert!(html.contains(r#"class="language-rust""#));
    }

    #[test]
    fn test_trim_url() {
        assert_eq!(trim_url("https://x.io/a."), "https://x.io/a");
        assert_eq!(trim_url("https://x.io/a)"), "https://x.io/a");
        assert_eq!(trim_url("https://x.io/(a)"), "https://x.io/(a)");
    }
}
