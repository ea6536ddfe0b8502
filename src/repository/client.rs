// src/repository/client.rs

//! HTTP client for registry identity lookups
//!
//! Provides a wrapper around reqwest with retry support for asking npm and
//! bower which source repository a published package name points at.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::registry::Registry;

/// Retry delay in milliseconds, multiplied by the attempt number
const RETRY_DELAY_MS: u64 = 500;

/// Answers "which repository is `name` published from?"
///
/// Implementations are shared across verification workers.
pub trait RegistryLookup: Send + Sync {
    /// The repository URL a published package declares
    ///
    /// `Ok(None)` means the name is not published (or declares no
    /// repository). Errors are transport or protocol failures.
    fn repository_url(&self, registry: Registry, name: &str) -> Result<Option<String>>;
}

/// HTTP client wrapper with retry support
pub struct RegistryClient {
    client: Client,
    npm_url: Url,
    bower_url: Url,
    max_retries: u32,
}

impl RegistryClient {
    /// Create a new registry client
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("ripple/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Registry(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            npm_url: config.base_url(Registry::Npm)?,
            bower_url: config.base_url(Registry::Bower)?,
            max_retries: config.max_retries.max(1),
        })
    }

    /// Registry API URL describing a package
    ///
    /// npm: `{base}/{name}` (the packument), bower: `{base}/packages/{name}`.
    /// Names are percent-encoded so scoped npm names stay one path segment.
    pub fn package_url(&self, registry: Registry, name: &str) -> Result<Url> {
        let encoded = urlencoding::encode(name);
        let joined = match registry {
            Registry::Npm => self.npm_url.join(&encoded),
            Registry::Bower => self.bower_url.join(&format!("packages/{encoded}")),
        };
        joined.map_err(|e| Error::Registry(format!("invalid package url for {name}: {e}")))
    }

    /// GET a JSON document, `Ok(None)` on 404
    fn fetch_json(&self, url: &Url) -> Result<Option<Value>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url.clone()).send() {
                Ok(response) => {
                    if response.status() == StatusCode::NOT_FOUND {
                        return Ok(None);
                    }
                    if !response.status().is_success() {
                        return Err(Error::Registry(format!(
                            "HTTP {} from {}",
                            response.status(),
                            url
                        )));
                    }
                    let body = response.json().map_err(|e| {
                        Error::Registry(format!("failed to parse JSON from {url}: {e}"))
                    })?;
                    return Ok(Some(body));
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::Registry(format!(
                            "failed to fetch {url} after {attempt} attempts: {e}"
                        )));
                    }
                    warn!("Registry fetch attempt {} for {} failed: {}, retrying...", attempt, url, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt)));
                }
            }
        }
    }
}

impl RegistryLookup for RegistryClient {
    fn repository_url(&self, registry: Registry, name: &str) -> Result<Option<String>> {
        let url = self.package_url(registry, name)?;
        debug!("Looking up {}:{} at {}", registry, name, url);

        Ok(self
            .fetch_json(&url)?
            .and_then(|body| repository_url_from(registry, &body)))
    }
}

/// Pull the repository URL out of a registry response
///
/// npm's `repository` is a string or `{ "url": ... }`; bower answers
/// `{ "name": ..., "url": ... }`.
pub fn repository_url_from(registry: Registry, body: &Value) -> Option<String> {
    let field = match registry {
        Registry::Npm => body.get("repository")?,
        Registry::Bower => body.get("url")?,
    };
    match field {
        Value::String(url) => Some(url.clone()),
        Value::Object(map) => map.get("url").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}
