//! Configuration module for Subway-Now
//!
//! This module handles loading, parsing, and validating the TOML file that
//! holds the account credentials.
//!
//! # Example
//!
//! ```no_run
//! use subway_now::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("subway.toml")).unwrap();
//! println!("Logging in as {}", config.account.email);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AccountConfig, Config, Credentials, LoggingConfig, SiteConfig, UserAgentConfig,
    DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
