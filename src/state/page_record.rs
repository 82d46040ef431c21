/// Result of attempting a page, as recorded in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    /// Fetched and parsed successfully
    Ok,

    /// The request failed before a response was received
    RequestError,

    /// The response body could not be read or parsed
    ParseError,

    /// Blocked by an `X-Robots-Tag` header or a robots meta tag
    RobotsTagBlocked,

    /// Disallowed by the site's robots.txt
    RobotsTxtDisallowed,

    /// The server answered with a status other than 200
    Http(u16),
}

impl PageStatus {
    /// Numeric code shown in reports: 0 for success, 1-4 for internal
    /// failures, the HTTP status otherwise
    pub fn code(&self) -> u16 {
        match self {
            Self::Ok => 0,
            Self::RequestError => 1,
            Self::ParseError => 2,
            Self::RobotsTagBlocked => 3,
            Self::RobotsTxtDisallowed => 4,
            Self::Http(status) => *status,
        }
    }

    /// Returns true if the page was fetched successfully
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns true if the crawler chose not to follow the page, as opposed to
    /// being unable to reach it
    pub fn is_policy_block(&self) -> bool {
        matches!(self, Self::RobotsTagBlocked | Self::RobotsTxtDisallowed)
    }
}

impl std::fmt::Display for PageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One attempted page
///
/// Created once per unique link the first time it is resolved and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Absolute URL of the page; unique within a registry
    pub link: String,

    /// URL declared by the page's `<link rel="canonical">`, if any
    pub canonical_link: Option<String>,

    /// Outcome of the attempt
    pub status: PageStatus,
}

impl PageRecord {
    pub fn succeeded(link: impl Into<String>, canonical_link: Option<String>) -> Self {
        Self {
            link: link.into(),
            canonical_link,
            status: PageStatus::Ok,
        }
    }

    pub fn failed(link: impl Into<String>, status: PageStatus) -> Self {
        Self {
            link: link.into(),
            canonical_link: None,
            status,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    /// The link the page should be listed under in a sitemap
    pub fn sitemap_link(&self) -> &str {
        self.canonical_link.as_deref().unwrap_or(&self.link)
    }
}
