// src/ingest.rs

//! From manifest records to a repo graph
//!
//! Records come from a scan of many repositories, one JSON object per line:
//!
//! ```json
//! {"repository": "Financial-Times/o-table", "filepath": "bower.json", "fileContents": "{...}"}
//! ```
//!
//! Bad records are skipped and reported, never fatal. Records without a
//! manifest body are dropped silently.

use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::manifest::{Manifest, ManifestRecord};
use crate::normaliser::{ManifestNormaliser, NormaliseReport};
use crate::registry::Registry;
use crate::resolver::RepoGraph;

/// A record that could not be used
#[derive(Debug)]
pub struct SkippedRecord {
    /// Repo id, or the input line when the record could not be parsed at all
    pub location: String,
    pub error: Error,
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.error)
    }
}

/// Parsed records plus the lines that failed to parse
#[derive(Debug, Default)]
pub struct RecordBatch {
    pub records: Vec<ManifestRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Result of [`build_graph`]
#[derive(Debug)]
pub struct Ingest {
    pub graph: RepoGraph,
    pub report: NormaliseReport,
    pub skipped: Vec<SkippedRecord>,
}

/// Read newline-delimited JSON records, ignoring blank lines
pub fn read_records(reader: impl BufRead) -> Result<RecordBatch> {
    let mut batch = RecordBatch::default();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(Error::ReadRecords)?;
        if line.trim().is_empty() {
            continue;
        }
        match ManifestRecord::from_json_line(&line) {
            Ok(record) => batch.records.push(record),
            Err(error) => {
                warn!("Skipping line {}: {}", i + 1, error);
                batch.skipped.push(SkippedRecord {
                    location: format!("line {}", i + 1),
                    error,
                });
            }
        }
    }
    debug!(
        "Read {} record(s), skipped {}",
        batch.records.len(),
        batch.skipped.len()
    );
    Ok(batch)
}

/// Parse, normalise and link manifest records into a graph
///
/// A later record for the same repo and registry replaces an earlier one.
pub fn build_graph(
    records: impl IntoIterator<Item = ManifestRecord>,
    normaliser: &mut ManifestNormaliser,
) -> Result<Ingest> {
    let mut manifests: Vec<Manifest> = Vec::new();
    let mut index: HashMap<(String, Registry), usize> = HashMap::new();
    let mut skipped = Vec::new();

    for record in records {
        let location = record.repository.clone();
        match record.into_manifest() {
            Ok(Some(manifest)) => {
                let key = (manifest.repo_id().to_string(), manifest.registry());
                match index.get(&key) {
                    Some(&pos) => {
                        warn!("Replacing duplicate {} manifest for {}", key.1, key.0);
                        manifests[pos] = manifest;
                    }
                    None => {
                        index.insert(key, manifests.len());
                        manifests.push(manifest);
                    }
                }
            }
            Ok(None) => debug!("No manifest body for {}", location),
            Err(error) => {
                warn!("Skipping record for {}: {}", location, error);
                skipped.push(SkippedRecord { location, error });
            }
        }
    }

    let report = normaliser.normalise(&mut manifests)?;

    let mut builder = RepoGraph::builder();
    for manifest in manifests {
        builder.add_manifest(manifest);
    }
    let graph = builder.build();
    info!(
        "Loaded {} repo(s), skipped {} record(s)",
        graph.len(),
        skipped.len()
    );

    Ok(Ingest {
        graph,
        report,
        skipped,
    })
}
