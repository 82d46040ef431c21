//! Configuration module for Quatermain
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and layering command-line overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use quatermain::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("quatermain.toml")).unwrap();
//! println!("Crawler will open at most {} connections", config.crawler.max_connections);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, resolve_config, ConfigOverrides};
pub use validation::MIN_CONNECTIONS;
