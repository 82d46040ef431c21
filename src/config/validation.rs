use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;

/// Minimum number of simultaneous connections a crawl may run with
pub const MIN_CONNECTIONS: usize = 2;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_connections < MIN_CONNECTIONS {
        return Err(ConfigError::Validation(format!(
            "max-connections must be >= {}, got {}",
            MIN_CONNECTIONS, config.max_connections
        )));
    }

    if !config.request_interval.is_finite() || config.request_interval < 0.0 {
        return Err(ConfigError::Validation(format!(
            "request-interval must be a non-negative number of seconds, got {}",
            config.request_interval
        )));
    }

    if config.retry_delay == 0 {
        return Err(ConfigError::Validation(
            "retry-delay must be >= 1ms".to_string(),
        ));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request-timeout must be >= 1s".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user agent name cannot be empty".to_string(),
        ));
    }

    // The name is matched verbatim against robots.txt User-agent lines
    if config.name.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "user agent name must not contain whitespace, got '{}'",
            config.name
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.sitemap_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "sitemap-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
