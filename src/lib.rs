//! Subway-Now: order your saved favorites from subwaynow.com
//!
//! This crate logs a user in, scrapes their saved favorite orders, walks a
//! favorite's checkout page into typed line items and prepares the final order.

pub mod agent;
pub mod config;
pub mod order;
pub mod output;
pub mod scrape;
pub mod session;

use thiserror::Error;

/// Main error type for Subway-Now operations
#[derive(Debug, Error)]
pub enum SubwayError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Extraction error on {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Never raised while final order transmission is disabled
    #[error("Order submission failed: {0}")]
    Submission(String),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

impl SubwayError {
    /// Builds an extraction error for the page at `url`
    pub fn extraction(url: impl ToString, message: impl Into<String>) -> Self {
        Self::Extraction {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Subway-Now operations
pub type Result<T> = std::result::Result<T, SubwayError>;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use order::CheckoutSession;
pub use scrape::{Favorite, LineItem, LineItemKind, Receipt};
pub use session::Subway;
