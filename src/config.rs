// src/config.rs

//! Run configuration
//!
//! Loaded from an optional TOML file. Every section has defaults, so an
//! empty file (or no file) gives online verification against the public
//! npm and bower registries with a cache under the user cache directory.
//!
//! # Example ripple.toml
//!
//! ```toml
//! [registry]
//! verify = true
//! timeout_secs = 30
//! concurrency = 4
//!
//! [cache]
//! path = "/tmp/ripple-names.json"
//!
//! # Components publish to npm under a scope their repo name lacks
//! [[naming_rules]]
//! name = "origami-scope"
//! registry = "npm"
//! pattern = "^(o-.+)$"
//! replacement = "@financial-times/$1"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};
use crate::normaliser::{PatternRule, host_parallelism};
use crate::registry::Registry;

const DEFAULT_NPM_URL: &str = "https://registry.npmjs.org/";
const DEFAULT_BOWER_URL: &str = "https://registry.bower.io/";

/// Cache file name under the platform cache directory
const CACHE_DIR_NAME: &str = "ripple";
const CACHE_FILE_NAME: &str = "registry-names.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub registry: RegistryConfig,
    pub cache: CacheConfig,
    pub naming_rules: Vec<NamingRuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Verify declared names against the live registries
    pub verify: bool,
    pub npm_url: String,
    pub bower_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Worker count for lookups; host parallelism when unset
    pub concurrency: Option<usize>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            verify: true,
            npm_url: DEFAULT_NPM_URL.to_string(),
            bower_url: DEFAULT_BOWER_URL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            concurrency: None,
        }
    }
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL of a registry's HTTP API
    pub fn base_url(&self, registry: Registry) -> Result<Url> {
        let raw = match registry {
            Registry::Npm => &self.npm_url,
            Registry::Bower => &self.bower_url,
        };
        // Url::join drops the last segment unless the base ends with '/'
        let raw = if raw.ends_with('/') {
            raw.clone()
        } else {
            format!("{raw}/")
        };
        Url::parse(&raw)
            .map_err(|e| Error::InvalidConfig(format!("{registry} registry url '{raw}': {e}")))
    }

    /// Number of verification workers: configured, else host parallelism, never zero
    pub fn workers(&self) -> usize {
        self.concurrency.unwrap_or_else(host_parallelism).max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub path: Option<PathBuf>,
}

impl CacheConfig {
    /// Configured cache path, else the platform cache directory
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            dirs::cache_dir().map(|dir| dir.join(CACHE_DIR_NAME).join(CACHE_FILE_NAME))
        })
    }
}

/// A regex rewrite of declared names, applied during normalisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingRuleConfig {
    pub name: String,
    /// Only rewrite manifests of this registry; all when absent
    #[serde(default)]
    pub registry: Option<Registry>,
    pub pattern: String,
    pub replacement: String,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Compile the configured naming rules in file order
    pub fn naming_rules(&self) -> Result<Vec<PatternRule>> {
        self.naming_rules.iter().map(PatternRule::from_config).collect()
    }

    fn validate(&self) -> Result<()> {
        for registry in Registry::ALL {
            self.registry.base_url(registry)?;
        }
        if self.registry.concurrency == Some(0) {
            return Err(Error::InvalidConfig(
                "registry.concurrency must be at least 1".to_string(),
            ));
        }
        self.naming_rules()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.registry.verify);
        assert!(config.naming_rules.is_empty());
        assert!(config.registry.workers() >= 1);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            [registry]
            verify = false
            npm_url = "http://localhost:4873"
            concurrency = 2

            [cache]
            path = "/tmp/names.json"

            [[naming_rules]]
            name = "origami-scope"
            registry = "npm"
            pattern = "^(o-.+)$"
            replacement = "@financial-times/$1"
            "#,
        )
        .unwrap();

        assert!(!config.registry.verify);
        assert_eq!(config.registry.workers(), 2);
        assert_eq!(
            config.registry.base_url(Registry::Npm).unwrap().as_str(),
            "http://localhost:4873/"
        );
        assert_eq!(config.cache.resolved_path(), Some(PathBuf::from("/tmp/names.json")));
        assert_eq!(config.naming_rules().unwrap().len(), 1);
        assert_eq!(config.naming_rules[0].registry, Some(Registry::Npm));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_toml_str("[registry]\nverfiy = true\n"),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_unknown_registry_in_rule_is_rejected() {
        let result = Config::from_toml_str(
            "[[naming_rules]]\nname = \"x\"\nregistry = \"composer\"\npattern = \"a\"\nreplacement = \"b\"\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_toml_str("[registry]\nconcurrency = 0\n"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[registry]\nnpm_url = \"not a url\"\n"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str(
                "[[naming_rules]]\nname = \"x\"\npattern = \"(\"\nreplacement = \"b\"\n"
            ),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/ripple.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
