use std::env;

use anyhow::Context;

use crate::api::{SearchOptions, Session};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/pages";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub access_token: Option<String>,
    pub recent_limit: usize,
    pub search: SearchOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            recent_limit: 5,
            search: SearchOptions::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            api_url: lookup("PAGES_API_URL").unwrap_or(defaults.api_url),
            access_token: lookup("PAGES_ACCESS_TOKEN").filter(|t| !t.trim().is_empty()),
            recent_limit: match lookup("PAGES_RECENT_LIMIT") {
                Some(v) => v.parse().context("PAGES_RECENT_LIMIT must be a number")?,
                None => defaults.recent_limit,
            },
            search: SearchOptions {
                include_public: match lookup("PAGES_SEARCH_INCLUDE_PUBLIC") {
                    Some(v) => v
                        .parse()
                        .context("PAGES_SEARCH_INCLUDE_PUBLIC must be true or false")?,
                    None => defaults.search.include_public,
                },
                limit: match lookup("PAGES_SEARCH_LIMIT") {
                    Some(v) => v.parse().context("PAGES_SEARCH_LIMIT must be a number")?,
                    None => defaults.search.limit,
                },
            },
        })
    }

    /// Session to attach to requests: an explicit token wins over the stored
    /// one.
    pub fn session(&self) -> anyhow::Result<Option<Session>> {
        match &self.access_token {
            Some(token) => Ok(Some(Session::new(token.clone()))),
            None => Session::load(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.access_token.is_none());
        assert_eq!(config.recent_limit, 5);
        assert!(config.search.include_public);
        assert_eq!(config.search.limit, 20);
    }

    #[test]
    fn env_values_override_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PAGES_API_URL", "https://notes.example.com/api/pages"),
            ("PAGES_ACCESS_TOKEN", "secret"),
            ("PAGES_RECENT_LIMIT", "8"),
            ("PAGES_SEARCH_INCLUDE_PUBLIC", "false"),
            ("PAGES_SEARCH_LIMIT", "50"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://notes.example.com/api/pages");
        assert_eq!(config.access_token.as_deref(), Some("secret"));
        assert_eq!(config.recent_limit, 8);
        assert!(!config.search.include_public);
        assert_eq!(config.search.limit, 50);
        assert_eq!(config.session().unwrap().unwrap().access_token, "secret");
    }

    #[test]
    fn blank_token_is_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[("PAGES_ACCESS_TOKEN", "  ")])).unwrap();
        assert!(config.access_token.is_none());
    }

    #[test]
    fn malformed_number_is_an_error() {
        let err = ClientConfig::from_lookup(lookup(&[("PAGES_RECENT_LIMIT", "lots")])).unwrap_err();
        assert!(err.to_string().contains("PAGES_RECENT_LIMIT"));
    }
}
