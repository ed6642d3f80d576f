//! Runtime configuration: validation mode, curated domain lists and probe
//! settings.
//!
//! With the `with-serde` feature the whole thing can be read from TOML:
//!
//! ```toml
//! validation_mode = "relaxed"
//!
//! [lists]
//! extra_disposable = ["trash.example"]
//! catch_all_hosts = ["hostinger.com", "cheap-hosting.example"]
//!
//! [probe]
//! timeout_ms = 8000
//! helo_name = "verifier.example.org"
//! ```

#[cfg(feature = "with-serde")]
mod error;

#[cfg(feature = "with-serde")]
pub use error::ConfigError;

use crate::lists::{CATCH_ALL_HOSTS, CONSUMER_PROVIDERS, DISPOSABLE_DOMAINS, DomainLists};
use crate::probe::ProbeOptions;
use crate::validator::ValidationMode;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default, deny_unknown_fields))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifierConfig {
    pub validation_mode: ValidationMode,
    pub lists: ListsConfig,
    pub probe: ProbeOptions,
}

/// Curated lists. A list given here replaces the built-in one; `extra_*`
/// entries are appended to whichever list is in effect.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default, deny_unknown_fields))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListsConfig {
    pub disposable: Option<Vec<String>>,
    pub consumer_providers: Option<Vec<String>>,
    pub catch_all_hosts: Option<Vec<String>>,
    pub extra_disposable: Vec<String>,
    pub extra_consumer_providers: Vec<String>,
    pub extra_catch_all_hosts: Vec<String>,
}

impl ListsConfig {
    pub fn build(&self) -> DomainLists {
        DomainLists::new(
            merged(
                self.disposable.as_deref(),
                DISPOSABLE_DOMAINS.iter(),
                &self.extra_disposable,
            ),
            merged(
                self.consumer_providers.as_deref(),
                CONSUMER_PROVIDERS.iter(),
                &self.extra_consumer_providers,
            ),
            merged(
                self.catch_all_hosts.as_deref(),
                CATCH_ALL_HOSTS.iter(),
                &self.extra_catch_all_hosts,
            ),
        )
    }
}

fn merged<'a>(
    custom: Option<&[String]>,
    builtin: impl Iterator<Item = &'a &'static str>,
    extra: &[String],
) -> Vec<String> {
    let mut list: Vec<String> = match custom {
        Some(custom) => custom.to_vec(),
        None => builtin.map(|entry| entry.to_string()).collect(),
    };
    list.extend(extra.iter().cloned());
    list
}

#[cfg(feature = "with-serde")]
impl VerifierConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::parse)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::read(path, err))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}
