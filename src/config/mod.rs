//! Configuration module for Link-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use link_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("At most {} pages open at once", config.crawler.max_concurrent_pages_open);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, InputConfig, OutputConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, MAX_CONCURRENT_PAGES};
