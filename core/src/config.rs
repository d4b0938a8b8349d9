//! Client configuration.
//!
//! Values are kept as supplied (including absent ones) and only judged by
//! `MenuHttpClient::create`, so every construction error carries the same
//! message whether the config came from code or from the environment.

use std::time::Duration;

use crate::error::ApiError;

pub const ENV_BASE_URL: &str = "WHATSAMENU_BASE_URL";
pub const ENV_API_KEY: &str = "WHATSAMENU_API_KEY";
pub const ENV_TIMEOUT_MS: &str = "WHATSAMENU_TIMEOUT_MS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Whole-request timeout handed to the transport. `None` leaves the
    /// transport's default in place.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            api_key: Some(api_key.to_string()),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `WHATSAMENU_BASE_URL`, `WHATSAMENU_API_KEY` and
    /// `WHATSAMENU_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let timeout = match lookup(ENV_TIMEOUT_MS) {
            Some(raw) => {
                let millis = raw.trim().parse::<u64>().map_err(|_| {
                    ApiError::Configuration(format!("invalid {ENV_TIMEOUT_MS}: {raw}"))
                })?;
                Some(Duration::from_millis(millis))
            }
            None => None,
        };
        Ok(Self {
            base_url: lookup(ENV_BASE_URL),
            api_key: lookup(ENV_API_KEY),
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "http://127.0.0.1:9200/v1"),
            (ENV_API_KEY, "WM.secret"),
            (ENV_TIMEOUT_MS, "25000"),
        ]))
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://127.0.0.1:9200/v1"));
        assert_eq!(config.api_key.as_deref(), Some("WM.secret"));
        assert_eq!(config.timeout, Some(Duration::from_secs(25)));
    }

    #[test]
    fn missing_variables_stay_absent() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_MS, "soon")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid WHATSAMENU_TIMEOUT_MS: soon");
    }

    #[test]
    fn builder_sets_timeout() {
        let config = ClientConfig::new("http://localhost:3000", "WM.x").with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
