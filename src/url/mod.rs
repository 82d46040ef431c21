//! URL handling module for Quatermain
//!
//! This module decides which links discovered on a page may enter the crawl:
//! it resolves raw hrefs against the seed's origin, rejects anything that is
//! not an in-domain page, and canonicalizes the rest.

mod domain;
mod extension;
mod resolve;

// Re-export main types and functions
pub use domain::{DomainScope, SeedOrigin};
pub use extension::{is_page_extension, path_extension, PAGE_EXTENSIONS};
pub use resolve::LinkClassifier;

/// An `<a>` element as found in a page's markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw `href` attribute value
    pub href: String,

    /// Raw `rel` attribute value, if present
    pub rel: Option<String>,

    /// Whether the element carries a `download` attribute
    pub download: bool,
}

impl Anchor {
    /// Creates an anchor with only an href
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: None,
            download: false,
        }
    }
}

/// Reasons a link is not followed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The href is empty
    Empty,
    /// The href only points at a fragment of the current page
    HashOnly,
    /// A `tel:` link
    Phone,
    /// A `mailto:` link
    Email,
    /// The link leaves the crawled domain
    OutOfDomain,
    /// The anchor carries a `download` attribute
    Download,
    /// The link points at a file that is not a page
    Media,
    /// The anchor is marked `rel="nofollow"` and the crawl is ethical
    NoFollow,
    /// The href could not be parsed as a URL
    Malformed,
}

impl Rejection {
    /// Short label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::HashOnly => "hash-only",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::OutOfDomain => "out of domain",
            Self::Download => "download",
            Self::Media => "media",
            Self::NoFollow => "nofollow",
            Self::Malformed => "malformed",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
