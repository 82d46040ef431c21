use crate::url::domain::{DomainScope, SeedOrigin};
use crate::url::extension::{is_page_extension, path_extension};
use crate::url::{Anchor, Rejection};
use std::borrow::Cow;
use url::{ParseError, Url};

/// Decides which anchors of a page are followable, in-domain pages
///
/// The classifier is pure: it performs no I/O and holds no mutable state, so
/// the same anchor always yields the same decision.
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    protocol: String,
    domain: String,
    scope: DomainScope,
    ethical: bool,
}

impl LinkClassifier {
    /// Creates a classifier for links found under `protocol://domain`
    pub fn new(protocol: &str, domain: &str, ethical: bool) -> Self {
        Self {
            protocol: protocol.to_string(),
            domain: domain.to_string(),
            scope: DomainScope::new(domain),
            ethical,
        }
    }

    /// Creates a classifier scoped to a crawl's seed origin
    pub fn for_origin(origin: &SeedOrigin, ethical: bool) -> Self {
        Self::new(&origin.protocol, &origin.domain, ethical)
    }

    /// Classifies one anchor of a page
    pub fn classify(&self, anchor: &Anchor) -> Result<Url, Rejection> {
        self.resolve(&anchor.href, anchor.rel.as_deref(), anchor.download)
    }

    /// Resolves a raw href into its canonical absolute form, or rejects it
    ///
    /// # Rules
    ///
    /// Checked in order, first match wins:
    ///
    /// 1. Empty href → `Empty`
    /// 2. `//host/path` is given the crawl protocol
    /// 3. `/path` is resolved against `protocol://domain`
    /// 4. `#fragment` → `HashOnly`
    /// 5. `tel:` / `mailto:` → `Phone` / `Email`
    /// 6. Authority other than `{http,https}://{www.,}domain` → `OutOfDomain`
    /// 7. `download` attribute present → `Download`
    /// 8. Final path segment with an extension outside
    ///    `{html, asp, php, ""}` → `Media`
    /// 9. `rel` containing `nofollow` in ethical mode → `NoFollow`
    ///
    /// An accepted link has its fragment removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use quatermain::url::{LinkClassifier, Rejection};
    ///
    /// let classifier = LinkClassifier::new("https", "example.com", true);
    ///
    /// let url = classifier.resolve("/about#team", None, false).unwrap();
    /// assert_eq!(url.as_str(), "https://example.com/about");
    ///
    /// let rejected = classifier.resolve("https://other.com/", None, false);
    /// assert_eq!(rejected, Err(Rejection::OutOfDomain));
    /// ```
    pub fn resolve(
        &self,
        href: &str,
        rel: Option<&str>,
        download: bool,
    ) -> Result<Url, Rejection> {
        let cleaned: String = href.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        let href = cleaned.trim();

        if href.is_empty() {
            return Err(Rejection::Empty);
        }

        let absolute: Cow<'_, str> = if href.starts_with("//") {
            Cow::Owned(format!("{}:{}", self.protocol, href))
        } else if href.starts_with('/') {
            Cow::Owned(format!("{}://{}{}", self.protocol, self.domain, href))
        } else {
            Cow::Borrowed(href)
        };

        if absolute.starts_with('#') {
            return Err(Rejection::HashOnly);
        }

        if has_scheme(&absolute, "tel:") {
            return Err(Rejection::Phone);
        }
        if has_scheme(&absolute, "mailto:") {
            return Err(Rejection::Email);
        }

        let mut url = match Url::parse(&absolute) {
            Ok(url) => url,
            // Relative paths without a leading slash have no authority at all
            Err(ParseError::RelativeUrlWithoutBase) => return Err(Rejection::OutOfDomain),
            Err(_) => return Err(Rejection::Malformed),
        };

        if !self.scope.contains(&url) {
            return Err(Rejection::OutOfDomain);
        }

        if download {
            return Err(Rejection::Download);
        }

        if !is_page_extension(path_extension(url.path())) {
            return Err(Rejection::Media);
        }

        if self.ethical && rel.is_some_and(has_nofollow) {
            return Err(Rejection::NoFollow);
        }

        url.set_fragment(None);
        Ok(url)
    }
}

fn has_scheme(href: &str, scheme: &str) -> bool {
    href.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

fn has_nofollow(rel: &str) -> bool {
    rel.to_ascii_lowercase().contains("nofollow")
}
