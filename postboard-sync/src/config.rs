//! Configuration for the synchronization layer
//!
//! Values come from, in increasing priority: [`ClientConfig::default`], the
//! process environment (after loading an optional `.env` file), and explicit
//! builder overrides.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Default REST service
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST service, without trailing slash
    pub base_url: String,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,

    /// Quiet period before the author search settles
    pub search_debounce: Duration,

    /// Posts per page in the author posts view
    pub page_size: usize,

    /// Allowed title length for new posts, in characters of the trimmed text
    pub title_len: RangeInclusive<usize>,

    /// Allowed body length for new posts, in characters of the trimmed text
    pub body_len: RangeInclusive<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            search_debounce: Duration::from_millis(300),
            page_size: 4,
            title_len: 2..=100,
            body_len: 1..=2000,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for client configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load configuration from the environment, reading `.env` first if present
    ///
    /// Recognized variables: `POSTBOARD_BASE_URL`, `POSTBOARD_TIMEOUT_SECS`,
    /// `POSTBOARD_PAGE_SIZE`, `POSTBOARD_DEBOUNCE_MS`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut builder = Self::builder();

        if let Ok(url) = std::env::var("POSTBOARD_BASE_URL") {
            builder = builder.base_url(url);
        }
        if let Some(secs) = parse_env::<u64>("POSTBOARD_TIMEOUT_SECS")? {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(size) = parse_env::<usize>("POSTBOARD_PAGE_SIZE")? {
            builder = builder.page_size(size);
        }
        if let Some(ms) = parse_env::<u64>("POSTBOARD_DEBOUNCE_MS")? {
            builder = builder.search_debounce(Duration::from_millis(ms));
        }

        let config = builder.build();
        config.validate().map_err(SyncError::Config)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("base_url must be an http(s) URL, got {}", self.base_url));
        }

        if self.page_size == 0 {
            return Err("page_size must be greater than 0".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }

        if self.title_len.is_empty() || self.body_len.is_empty() {
            return Err("length bounds must not be empty ranges".to_string());
        }

        Ok(())
    }

    /// Join a REST path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| SyncError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

/// Builder for client configuration
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    request_timeout: Option<Duration>,
    search_debounce: Option<Duration>,
    page_size: Option<usize>,
    title_len: Option<RangeInclusive<usize>>,
    body_len: Option<RangeInclusive<usize>>,
}

impl ClientConfigBuilder {
    /// Set the REST base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the search quiet period
    pub fn search_debounce(mut self, quiet: Duration) -> Self {
        self.search_debounce = Some(quiet);
        self
    }

    /// Set posts per page
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Set allowed title length
    pub fn title_len(mut self, bounds: RangeInclusive<usize>) -> Self {
        self.title_len = Some(bounds);
        self
    }

    /// Set allowed body length
    pub fn body_len(mut self, bounds: RangeInclusive<usize>) -> Self {
        self.body_len = Some(bounds);
        self
    }

    /// Build the client configuration
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();

        ClientConfig {
            base_url: self
                .base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            search_debounce: self.search_debounce.unwrap_or(defaults.search_debounce),
            page_size: self.page_size.unwrap_or(defaults.page_size),
            title_len: self.title_len.unwrap_or(defaults.title_len),
            body_len: self.body_len.unwrap_or(defaults.body_len),
        }
    }
}
