//! # Configuration Module
//!
//! Runtime settings for action dispatch and response building, loaded from
//! environment variables or a YAML file.
//!
//! ## Environment Variables
//!
//! ### `BRRTA_DEBUG`
//!
//! When `true`, embedding an action that is not registered yields an empty
//! result instead of failing, so templates can be developed before their
//! actions exist. Default: `false`.
//!
//! ### `BRRTA_FALLBACK_MIME`
//!
//! Media type used when the body of a textual response cannot be sniffed.
//! Default: `text/plain`.
//!
//! ### `BRRTA_STRICT`
//!
//! When `true`, request data ignores the body and uploaded files for every
//! action unless the action says otherwise. Default: `false`.
//!
//! ### `BRRTA_HTMX`
//!
//! Enables the HTMX redirect adaptation (`HX-Location`, `202 → 303`).
//! Default: `true`.
//!
//! ## YAML
//!
//! ```yaml
//! debug: true
//! fallback_mime_type: "text/plain; charset=utf-8"
//! strict: false
//! htmx: true
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use brrtaction::config::ActionConfig;
//!
//! let config = ActionConfig::from_env();
//! println!("debug: {}", config.debug);
//! ```

use crate::response::DEFAULT_MIME_TYPE;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Runtime settings shared by all actions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Mock unregistered embedded actions with an empty result
    pub debug: bool,
    /// Media type used when sniffing fails
    pub fallback_mime_type: String,
    /// Default strictness of the request data merge
    pub strict: bool,
    /// Apply the HTMX redirect adaptation
    pub htmx: bool,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            debug: false,
            fallback_mime_type: DEFAULT_MIME_TYPE.to_string(),
            strict: false,
            htmx: true,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ActionConfig {
    /// Load configuration from environment variables
    ///
    /// Unset or unparseable variables keep their default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| parse_flag(&v))
                .unwrap_or(default)
        };
        Self {
            debug: flag("BRRTA_DEBUG", defaults.debug),
            fallback_mime_type: lookup("BRRTA_FALLBACK_MIME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.fallback_mime_type),
            strict: flag("BRRTA_STRICT", defaults.strict),
            htmx: flag("BRRTA_HTMX", defaults.htmx),
        }
    }

    /// Parse configuration from a YAML document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML or has fields of the
    /// wrong type. Missing fields keep their default.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse action configuration")
    }

    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ActionConfig::default();
        assert!(!config.debug);
        assert!(config.htmx);
        assert_eq!(config.fallback_mime_type, "text/plain");
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("BRRTA_DEBUG", "yes"),
            ("BRRTA_HTMX", "off"),
            ("BRRTA_STRICT", "maybe"),
            ("BRRTA_FALLBACK_MIME", "application/octet-stream"),
        ]
        .into_iter()
        .collect();
        let config = ActionConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert!(config.debug);
        assert!(!config.htmx);
        assert!(!config.strict);
        assert_eq!(config.fallback_mime_type, "application/octet-stream");
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = ActionConfig::from_yaml_str("debug: true\n").unwrap();
        assert!(config.debug);
        assert!(config.htmx);
        assert_eq!(config.fallback_mime_type, "text/plain");
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions.yaml");
        std::fs::write(&path, "htmx: false\nstrict: true\n").unwrap();
        let config = ActionConfig::from_yaml_file(&path).unwrap();
        assert!(!config.htmx);
        assert!(config.strict);
        assert!(ActionConfig::from_yaml_file(dir.path().join("missing.yaml")).is_err());
    }
}
