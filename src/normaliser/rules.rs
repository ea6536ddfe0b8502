// src/normaliser/rules.rs

//! Naming-correction rules
//!
//! Some repositories publish under a name their manifest does not declare,
//! e.g. a scope prefix added by the release pipeline. A rule recognises one
//! such convention and returns the corrected name. Rules are pure: they look
//! at one manifest and never touch anything else.

use regex::Regex;

use crate::config::NamingRuleConfig;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::registry::Registry;

/// A pure rewrite of one manifest's declared name
pub trait NamingRule: Send + Sync {
    /// Rule name, reported with every rename it causes
    fn name(&self) -> &str;

    /// The corrected name, or `None` to leave the manifest alone
    fn apply(&self, manifest: &Manifest) -> Option<String>;
}

/// Regex-based rule loaded from configuration
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    registry: Option<Registry>,
    pattern: Regex,
    replacement: String,
}

impl PatternRule {
    /// Compile a rule; `replacement` may use `$1`-style capture references
    pub fn new(
        name: impl Into<String>,
        registry: Option<Registry>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::InvalidConfig(format!("naming rule '{name}': {e}")))?;
        Ok(Self {
            name,
            registry,
            pattern,
            replacement: replacement.into(),
        })
    }

    pub fn from_config(config: &NamingRuleConfig) -> Result<Self> {
        Self::new(
            config.name.clone(),
            config.registry,
            &config.pattern,
            config.replacement.clone(),
        )
    }
}

impl NamingRule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, manifest: &Manifest) -> Option<String> {
        if self.registry.is_some_and(|r| r != manifest.registry()) {
            return None;
        }
        let declared = manifest.declared_name()?;
        if !self.pattern.is_match(declared) {
            return None;
        }
        let rewritten = self
            .pattern
            .replace(declared, self.replacement.as_str())
            .into_owned();
        (rewritten != declared).then_some(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope_rule() -> PatternRule {
        PatternRule::new(
            "origami-scope",
            Some(Registry::Npm),
            "^(o-.+)$",
            "@financial-times/$1",
        )
        .unwrap()
    }

    fn manifest(registry: Registry, name: Option<&str>) -> Manifest {
        Manifest::new("Financial-Times/o-table", registry, name.map(String::from), "")
    }

    #[test]
    fn test_rule_rewrites_matching_name() {
        let rule = scope_rule();
        assert_eq!(rule.name(), "origami-scope");
        assert_eq!(
            rule.apply(&manifest(Registry::Npm, Some("o-table"))).as_deref(),
            Some("@financial-times/o-table")
        );
    }

    #[test]
    fn test_rule_is_scoped_to_registry() {
        assert_eq!(scope_rule().apply(&manifest(Registry::Bower, Some("o-table"))), None);
    }

    #[test]
    fn test_rule_skips_other_names() {
        let rule = scope_rule();
        assert_eq!(rule.apply(&manifest(Registry::Npm, Some("widget"))), None);
        assert_eq!(rule.apply(&manifest(Registry::Npm, None)), None);
        // Already corrected
        assert_eq!(
            rule.apply(&manifest(Registry::Npm, Some("@financial-times/o-table"))),
            None
        );
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            PatternRule::new("broken", None, "(", "x"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let rule = PatternRule::from_config(&NamingRuleConfig {
            name: "strip-suffix".to_string(),
            registry: None,
            pattern: "^(.+)-legacy$".to_string(),
            replacement: "$1".to_string(),
        })
        .unwrap();
        assert_eq!(
            rule.apply(&manifest(Registry::Bower, Some("widget-legacy"))).as_deref(),
            Some("widget")
        );
    }
}
