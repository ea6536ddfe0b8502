// src/manifest/dependency.rs

//! A single declared dependency edge

use crate::error::Result;
use crate::registry::Registry;
use crate::version::{is_version_range, LATEST_TAG};

/// One entry of a manifest's `dependencies` table
///
/// Immutable once built. Whether the version string is a real range is
/// decided at construction so matching never re-parses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency {
    name: String,
    version_spec: String,
    registry: Registry,
    version_range: bool,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version_spec: impl Into<String>, registry: Registry) -> Self {
        let version_spec = version_spec.into();
        let version_range = is_version_range(&version_spec);
        Self {
            name: name.into(),
            version_spec,
            registry,
            version_range,
        }
    }

    /// Build from an untyped registry name, rejecting unknown registries
    pub fn parse(name: &str, version_spec: &str, registry: &str) -> Result<Self> {
        Ok(Self::new(name, version_spec, Registry::parse(registry)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version_spec(&self) -> &str {
        &self.version_spec
    }

    pub fn registry(&self) -> Registry {
        self.registry
    }

    pub fn is_version_range(&self) -> bool {
        self.version_range
    }

    pub fn is_latest(&self) -> bool {
        self.version_spec == LATEST_TAG
    }

    /// The version string when it names a repository rather than a version
    pub fn source_reference(&self) -> Option<&str> {
        if self.version_range || self.is_latest() {
            None
        } else {
            Some(&self.version_spec)
        }
    }

    /// Whether this dependency resolves through the registry by name
    pub fn is_by_name(&self) -> bool {
        self.source_reference().is_none()
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.registry, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_create_for_each_registry() {
        for registry in Registry::ALL {
            let dep = Dependency::new("a", "^1.0.0", registry);
            assert_eq!(dep.name(), "a");
            assert_eq!(dep.version_spec(), "^1.0.0");
            assert_eq!(dep.registry(), registry);
            assert!(dep.is_version_range());
            assert!(dep.is_by_name());
        }
    }

    #[test]
    fn test_parse_rejects_unsupported_registry() {
        assert!(matches!(
            Dependency::parse("a", "^1.0.0", "composer"),
            Err(Error::InvalidRegistry(_))
        ));
        assert!(Dependency::parse("a", "^1.0.0", "bower").is_ok());
    }

    #[test]
    fn test_git_reference_is_source_reference() {
        let dep = Dependency::new("ignored", "git+ssh://h:org/a.git#v1", Registry::Npm);
        assert!(!dep.is_version_range());
        assert_eq!(dep.source_reference(), Some("git+ssh://h:org/a.git#v1"));
    }

    #[test]
    fn test_latest_resolves_by_name() {
        let dep = Dependency::new("a", "latest", Registry::Npm);
        assert!(!dep.is_version_range());
        assert!(dep.is_latest());
        assert!(dep.source_reference().is_none());
    }

    #[test]
    fn test_display() {
        let dep = Dependency::new("o-table", "^7.0.0", Registry::Bower);
        assert_eq!(dep.to_string(), "bower:o-table");
    }
}
