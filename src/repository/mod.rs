// src/repository/mod.rs

//! Package registry access
//!
//! This module provides functionality for:
//! - Asking npm and bower which repository publishes a package name
//! - Retrying lookups that fail in transport
//! - Caching verification outcomes across runs

mod cache;
mod client;

// Re-export main types and functions
pub use cache::{JsonFileCache, MemoryCache, NameCache};
pub use client::{RegistryClient, RegistryLookup, repository_url_from};
