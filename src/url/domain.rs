use crate::UrlError;
use url::Url;

/// Protocol and domain a crawl is anchored to, taken from the seed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOrigin {
    /// The seed with its fragment removed
    pub seed: Url,

    /// Scheme of the seed (`http` or `https`)
    pub protocol: String,

    /// Authority of the seed (`host[:port]`), lowercased, without `www.`
    pub domain: String,
}

impl SeedOrigin {
    /// Parses a seed URL into the origin the crawl is scoped to
    ///
    /// # Examples
    ///
    /// ```
    /// use quatermain::url::SeedOrigin;
    ///
    /// let origin = SeedOrigin::parse("https://www.Example.com/start#top").unwrap();
    /// assert_eq!(origin.protocol, "https");
    /// assert_eq!(origin.domain, "example.com");
    /// assert_eq!(origin.seed.as_str(), "https://www.example.com/start");
    /// ```
    pub fn parse(seed: &str) -> Result<Self, UrlError> {
        let mut url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                url.scheme()
            )));
        }

        let authority = authority(&url).ok_or(UrlError::MissingDomain)?;
        let domain = match authority.strip_prefix("www.") {
            Some(rest) => rest.to_string(),
            None => authority,
        };

        url.set_fragment(None);

        Ok(Self {
            protocol: url.scheme().to_string(),
            domain,
            seed: url,
        })
    }

    /// Location of the site's robots.txt document
    pub fn robots_url(&self) -> String {
        format!("{}://{}/robots.txt", self.protocol, self.domain)
    }
}

/// The set of authorities considered in-domain for a crawl
///
/// Built once per crawl: `domain` and `www.domain`, reachable over either
/// `http` or `https`.
#[derive(Debug, Clone)]
pub struct DomainScope {
    authorities: [String; 2],
}

impl DomainScope {
    pub fn new(domain: &str) -> Self {
        let domain = domain.to_lowercase();
        Self {
            authorities: [format!("www.{}", domain), domain],
        }
    }

    /// Returns true when the URL is served by the crawl's own domain
    pub fn contains(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        match authority(url) {
            Some(candidate) => self.authorities.iter().any(|a| *a == candidate),
            None => false,
        }
    }
}

/// `host[:port]` of a URL, lowercased; the port only when it is not the
/// scheme's default
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
