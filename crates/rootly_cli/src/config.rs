//! Client configuration assembled from command-line flags.

use rootly_client::ClientConfig;
use std::time::Duration;
use thiserror::Error;

/// Errors in user-supplied configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No API key was supplied.
    #[error("an API key is required (--api-key or ROOTLY_API_KEY)")]
    MissingApiKey,

    /// The page size is out of range.
    #[error("page size must be between 1 and {max}, got {value}")]
    InvalidPageSize {
        /// Supplied value.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },
}

/// Largest page size Rootly accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Settings gathered from flags and environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key.
    pub api_key: Option<String>,
    /// API base URL.
    pub base_url: String,
    /// Items per page.
    pub page_size: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Settings {
    /// Validates the settings and builds a client configuration.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize {
                value: self.page_size,
                max: MAX_PAGE_SIZE,
            });
        }

        Ok(ClientConfig::new(api_key)
            .with_base_url(&self.base_url)
            .with_page_size(self.page_size)
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> Settings {
        Settings {
            api_key: api_key.map(str::to_string),
            base_url: "https://api.rootly.com".into(),
            page_size: 100,
            timeout_secs: 30,
        }
    }

    #[test]
    fn builds_client_config() {
        let config = settings(Some("rootly_abc")).client_config().unwrap();
        assert_eq!(config.base_url, "https://api.rootly.com");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn api_key_is_required() {
        assert_eq!(
            settings(None).client_config().unwrap_err(),
            ConfigError::MissingApiKey
        );
        assert_eq!(
            settings(Some("   ")).client_config().unwrap_err(),
            ConfigError::MissingApiKey
        );
    }

    #[test]
    fn page_size_is_bounded() {
        let mut s = settings(Some("key"));
        s.page_size = 0;
        assert!(matches!(
            s.client_config(),
            Err(ConfigError::InvalidPageSize { value: 0, .. })
        ));
        s.page_size = MAX_PAGE_SIZE + 1;
        assert!(s.client_config().is_err());
    }
}
