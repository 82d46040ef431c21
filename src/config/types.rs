use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Quatermain
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of concurrently in-flight fetches
    #[serde(rename = "max-connections")]
    pub max_connections: usize,

    /// Delay applied to every admitted task before its fetch (seconds)
    #[serde(rename = "request-interval")]
    pub request_interval: f64,

    /// Honor robots.txt, robots meta tags, X-Robots-Tag and rel="nofollow"
    pub ethical: bool,

    /// Backoff before a resource-exhausted fetch is re-enqueued (milliseconds)
    #[serde(rename = "retry-delay")]
    pub retry_delay: u64,

    /// Per-request timeout at the fetcher (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Seconds between progress log lines; 0 disables them
    #[serde(rename = "progress-interval")]
    pub progress_interval: u64,
}

impl CrawlerConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_secs_f64(self.request_interval)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_connections: 120,
            request_interval: 0.0,
            ethical: true,
            retry_delay: 1000,
            request_timeout: 30,
            progress_interval: 1,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Sent as the User-Agent header and matched against robots.txt sections
    pub name: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "quatermain".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the generated sitemap
    #[serde(rename = "sitemap-path")]
    pub sitemap_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sitemap_path: "sitemap.xml".to_string(),
        }
    }
}
