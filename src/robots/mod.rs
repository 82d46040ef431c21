//! Robots.txt handling module
//!
//! This module fetches and parses a site's robots.txt once at startup and
//! answers whether a URL may be crawled. Among the rules for the configured
//! user agent followed by the `*` rules, the last matching rule decides; a URL
//! that matches no rule is allowed.

mod parser;
mod pattern;

pub use parser::{parse_rules, RobotsRule};
pub use pattern::RulePattern;

use crate::crawler::{FetchError, Fetcher};

/// Parsed robots.txt rules for one user agent
#[derive(Debug, Clone, Default)]
pub struct RobotsEngine {
    rules: Vec<RobotsRule>,
}

impl RobotsEngine {
    /// Builds an engine from robots.txt content
    pub fn from_content(content: &str, user_agent: &str) -> Self {
        Self {
            rules: parse_rules(content, user_agent),
        }
    }

    /// An engine with no rules; everything is allowed
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Fetches and parses robots.txt
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The fetcher used for the crawl itself
    /// * `robots_url` - Absolute URL of the robots.txt file
    /// * `user_agent` - The agent whose section applies in addition to `*`
    ///
    /// # Returns
    ///
    /// * `Ok(RobotsEngine)` - Successfully fetched and parsed robots.txt
    /// * `Err(FetchError)` - The file could not be retrieved
    pub async fn load(
        fetcher: &dyn Fetcher,
        robots_url: &str,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let content = fetcher.fetch_text(robots_url).await?;
        let engine = Self::from_content(&content, user_agent);
        tracing::debug!(
            "Loaded {} robots.txt rules from {}",
            engine.rules.len(),
            robots_url
        );
        Ok(engine)
    }

    /// The applicable rules, agent-specific first
    pub fn rules(&self) -> &[RobotsRule] {
        &self.rules
    }

    /// Checks if a URL may be crawled
    ///
    /// # Returns
    ///
    /// * `true` - No rule matches, or the last matching rule is an `Allow`
    /// * `false` - The last matching rule is a `Disallow`
    pub fn is_allowed(&self, url: &str) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(url))
            .map_or(true, |rule| rule.allowed)
    }
}
