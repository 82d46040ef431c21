//! HTML document extraction
//!
//! A fetched page is parsed once into a `Document` holding only what the
//! crawler needs: the page's anchors, its robots meta directive and its
//! canonical link.

use crate::url::Anchor;
use scraper::{Html, Selector};

/// The parts of a fetched page the crawler acts on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    anchors: Vec<Anchor>,
    meta_robots: Option<String>,
    canonical_href: Option<String>,
}

impl Document {
    /// Parses HTML content
    ///
    /// Parsing is lenient: malformed markup yields whatever elements the
    /// HTML parser recovers.
    ///
    /// # Example
    ///
    /// ```
    /// use quatermain::crawler::Document;
    ///
    /// let html = r#"<html><head><link rel="canonical" href="/home"></head>
    ///     <body><a href="/about">About</a></body></html>"#;
    /// let document = Document::parse(html);
    /// assert_eq!(document.find_anchors().len(), 1);
    /// assert_eq!(document.find_canonical_href(), Some("/home"));
    /// ```
    pub fn parse(html: &str) -> Self {
        let html = Html::parse_document(html);

        Self {
            anchors: extract_anchors(&html),
            meta_robots: first_attr(&html, r#"meta[name="robots"]"#, "content"),
            canonical_href: first_attr(&html, r#"link[rel="canonical"]"#, "href"),
        }
    }

    /// All `<a>` elements in document order
    pub fn find_anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Content of `<meta name="robots">`, if present
    pub fn find_meta_robots_content(&self) -> Option<&str> {
        self.meta_robots.as_deref()
    }

    /// Href of `<link rel="canonical">`, if present
    pub fn find_canonical_href(&self) -> Option<&str> {
        self.canonical_href.as_deref()
    }

    /// Returns true if the robots meta tag forbids indexing or following
    pub fn blocked_by_meta_robots(&self) -> bool {
        self.meta_robots
            .as_deref()
            .is_some_and(forbids_indexing_or_following)
    }
}

/// Returns true if a robots directive contains `noindex` or `nofollow`
///
/// Used for both the robots meta tag and the `X-Robots-Tag` header.
pub fn forbids_indexing_or_following(directive: &str) -> bool {
    let directive = directive.to_ascii_lowercase();
    directive.contains("noindex") || directive.contains("nofollow")
}

fn extract_anchors(html: &Html) -> Vec<Anchor> {
    let Ok(selector) = Selector::parse("a") else {
        return Vec::new();
    };

    html.select(&selector)
        .map(|element| {
            let element = element.value();
            Anchor {
                href: element.attr("href").unwrap_or_default().to_string(),
                rel: element.attr("rel").map(str::to_string),
                download: element.attr("download").is_some(),
            }
        })
        .collect()
}

fn first_attr(html: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    html.select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string)
}
