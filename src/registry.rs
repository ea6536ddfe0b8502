// src/registry.rs

//! Package registries a manifest can be published to

use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::{Error, Result};

/// A package index: npm (`package.json`) or bower (`bower.json`)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Registry {
    Npm,
    Bower,
}

impl Registry {
    pub const ALL: [Registry; 2] = [Registry::Npm, Registry::Bower];

    /// Parse a registry name, rejecting anything but `npm` and `bower`
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| Error::InvalidRegistry(name.to_string()))
    }

    /// Map a manifest file path to its registry
    ///
    /// `package.json` is npm, `bower.json` is bower. The directory part is
    /// ignored, so `sub/package.json` is still npm.
    pub fn from_manifest_path(path: &str) -> Result<Self> {
        let stem = Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        match stem {
            "package" => Ok(Self::Npm),
            "bower" => Ok(Self::Bower),
            _ => Err(Error::UnsupportedManifestFile(path.to_string())),
        }
    }

    /// The manifest file name this registry reads
    pub const fn manifest_file(&self) -> &'static str {
        match self {
            Self::Npm => "package.json",
            Self::Bower => "bower.json",
        }
    }
}
