use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Values given on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_connections: Option<usize>,
    pub request_interval: Option<f64>,
    pub unethical: bool,
    pub user_agent: Option<String>,
    pub sitemap_path: Option<String>,
}

impl ConfigOverrides {
    /// Applies every override that was actually given
    pub fn apply(&self, config: &mut Config) {
        if let Some(max_connections) = self.max_connections {
            config.crawler.max_connections = max_connections;
        }
        if let Some(interval) = self.request_interval {
            config.crawler.request_interval = interval;
        }
        if self.unethical {
            config.crawler.ethical = false;
        }
        if let Some(name) = &self.user_agent {
            config.user_agent.name = name.clone();
        }
        if let Some(path) = &self.sitemap_path {
            config.output.sitemap_path = path.clone();
        }
    }
}

/// Loads, parses and validates a configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config_file(path)?;
    validate(&config)?;
    Ok(config)
}

/// Builds the effective configuration for a run
///
/// Starts from the file at `path` (or the defaults when no file is given),
/// layers the command-line overrides on top and validates the result.
///
/// # Example
///
/// ```
/// use quatermain::config::{resolve_config, ConfigOverrides};
///
/// let overrides = ConfigOverrides {
///     max_connections: Some(4),
///     ..Default::default()
/// };
/// let config = resolve_config(None, &overrides).unwrap();
/// assert_eq!(config.crawler.max_connections, 4);
/// ```
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    overrides.apply(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Reads and parses a TOML file without validating it
fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
