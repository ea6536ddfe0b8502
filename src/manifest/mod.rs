// src/manifest/mod.rs

//! Package manifests (`package.json` / `bower.json`) and their dependencies
//!
//! A [`Manifest`] is one repository's descriptor for one registry. Its
//! declared name is the only field that changes after parsing, and only
//! the normaliser may change it.

mod dependency;
mod record;

pub use dependency::Dependency;
pub use record::ManifestRecord;

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::Registry;

/// The subset of a manifest body ripple reads
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    repository: Option<RawRepository>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    dependencies: Option<BTreeMap<String, Value>>,
}

/// `"repository"` is either a URL string or `{ "type": ..., "url": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRepository {
    Url(String),
    Object {
        #[serde(default)]
        url: Option<String>,
    },
    Other(Value),
}

impl RawRepository {
    fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Object { url } => url.as_deref(),
            Self::Other(_) => None,
        }
    }
}

/// One repository's declared package descriptor for one registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    repo_id: String,
    registry: Registry,
    declared_name: Option<String>,
    source_url: String,
    dependencies: BTreeSet<Dependency>,
}

impl Manifest {
    pub fn new(
        repo_id: impl Into<String>,
        registry: Registry,
        declared_name: Option<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            repo_id: repo_id.into(),
            registry,
            declared_name,
            source_url: source_url.into(),
            dependencies: BTreeSet::new(),
        }
    }

    /// Add a dependency declared in this manifest's registry
    pub fn with_dependency(mut self, name: impl Into<String>, version_spec: impl Into<String>) -> Self {
        self.dependencies
            .insert(Dependency::new(name, version_spec, self.registry));
        self
    }

    /// Parse a manifest body given as JSON text
    pub fn parse(repo_id: &str, registry: Registry, body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).map_err(|source| Error::MalformedManifest {
            repo_id: repo_id.to_string(),
            registry,
            source,
        })?;
        Self::from_value(repo_id, registry, value)
    }

    /// Build a manifest from an already parsed JSON body
    ///
    /// The source URL is `repository.url` (or a bare `repository` string),
    /// falling back to `homepage`, falling back to the empty string.
    /// Dependencies whose version is not a string are ignored.
    pub fn from_value(repo_id: &str, registry: Registry, body: Value) -> Result<Self> {
        let raw: RawManifest =
            serde_json::from_value(body).map_err(|source| Error::MalformedManifest {
                repo_id: repo_id.to_string(),
                registry,
                source,
            })?;

        let source_url = raw
            .repository
            .as_ref()
            .and_then(RawRepository::url)
            .filter(|url| !url.is_empty())
            .or(raw.homepage.as_deref())
            .unwrap_or_default()
            .to_string();

        let mut manifest = Self::new(repo_id, registry, raw.name, source_url);
        for (name, version) in raw.dependencies.unwrap_or_default() {
            match version {
                Value::String(spec) => {
                    manifest.dependencies.insert(Dependency::new(name, spec, registry));
                }
                other => debug!(
                    "Ignoring {} dependency {} of {} with non-string version {}",
                    registry, name, repo_id, other
                ),
            }
        }
        Ok(manifest)
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    pub fn registry(&self) -> Registry {
        self.registry
    }

    pub fn declared_name(&self) -> Option<&str> {
        self.declared_name.as_deref()
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn dependencies(&self) -> &BTreeSet<Dependency> {
        &self.dependencies
    }

    /// Whether `dependency` asks the registry for this manifest's package by name
    ///
    /// Source-reference dependencies point at repositories, not names, so
    /// they never count.
    pub fn is_referenced_by(&self, dependency: &Dependency) -> bool {
        dependency.registry() == self.registry
            && dependency.is_by_name()
            && self.declared_name.as_deref() == Some(dependency.name())
    }

    /// Rewrite the declared name. Normalisation only.
    pub(crate) fn rename(&mut self, name: String) -> Option<String> {
        self.declared_name.replace(name)
    }
}

/// The part after the last `/`, e.g. `o-table` for `@financial-times/o-table`
pub fn trailing_segment(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
