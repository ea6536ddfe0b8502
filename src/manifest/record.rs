// src/manifest/record.rs

//! Raw manifest-scan records
//!
//! Each record is one line of a code-search export: the repository id, the
//! path of the manifest file that was found and its contents. The contents
//! are usually a JSON string, occasionally an inline object, and null when
//! the repository has no such manifest.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Manifest;
use crate::error::{Error, Result};
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub repository: String,
    #[serde(rename = "filepath")]
    pub file_path: String,
    #[serde(rename = "fileContents", default)]
    pub file_contents: Option<Value>,
}

impl ManifestRecord {
    pub fn new(
        repository: impl Into<String>,
        file_path: impl Into<String>,
        file_contents: Option<Value>,
    ) -> Self {
        Self {
            repository: repository.into(),
            file_path: file_path.into(),
            file_contents,
        }
    }

    /// Parse one newline-delimited JSON record
    pub fn from_json_line(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(Error::MalformedRecord)
    }

    pub fn registry(&self) -> Result<Registry> {
        Registry::from_manifest_path(&self.file_path)
    }

    /// Convert into a manifest
    ///
    /// The file name is validated first, so an unsupported manifest file is
    /// an error even when it has no contents. `Ok(None)` means no manifest
    /// was found for this repository and registry.
    pub fn into_manifest(self) -> Result<Option<Manifest>> {
        let registry = self.registry()?;

        match self.file_contents {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(body)) if body.trim().is_empty() => Ok(None),
            Some(Value::String(body)) => {
                Manifest::parse(&self.repository, registry, &body).map(Some)
            }
            Some(body) => Manifest::from_value(&self.repository, registry, body).map(Some),
        }
    }
}
