//! Batch installation of dictionary entries
//!
//! A single bad entry never aborts an install. Each raw entry ends up in
//! exactly one bucket of the [`InstallReport`]:
//! - **installed** - accepted by the store
//! - **skipped** - malformed, or its id was already seen in this batch or
//!   already present in the store
//! - **errors** - well-formed but the store failed to write it

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::StorageResult;
use crate::models::{WordEntry, normalize_language};

/// Write side of a dictionary
pub trait DictionaryStore {
    fn contains(&self, id: &str) -> bool;
    fn insert(&self, entry: WordEntry) -> StorageResult<()>;
}

/// One entry that was not installed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryIssue {
    /// Position of the entry in the batch
    pub index: usize,
    /// Entry id, when one could be read
    pub id: Option<String>,
    pub reason: String,
}

/// Outcome of one install batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallReport {
    pub installed: usize,
    pub skipped: Vec<EntryIssue>,
    pub errors: Vec<EntryIssue>,
}

impl InstallReport {
    pub fn total(&self) -> usize {
        self.installed + self.skipped.len() + self.errors.len()
    }
}

/// Install a batch of raw JSON entries into `store`
///
/// Entries are parsed and validated one at a time and their language codes are
/// normalized before insertion.
///
/// # Arguments
///
/// * `store` - Destination dictionary
/// * `raw` - Entries as decoded JSON, typically from a dictionary file
///
/// # Returns
///
/// An [`InstallReport`] accounting for every entry in `raw`
///
/// # Example
///
/// ```ignore
/// let dictionary = InMemoryDictionary::new();
/// let report = install_entries(&dictionary, vec![json!({"id": "1", "sourceWord": "house", ...})]);
/// assert_eq!(report.total(), 1);
/// ```
pub fn install_entries<S: DictionaryStore + ?Sized>(store: &S, raw: Vec<Value>) -> InstallReport {
    let mut report = InstallReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, value) in raw.into_iter().enumerate() {
        let raw_id = value.get("id").and_then(Value::as_str).map(str::to_string);

        let entry = match prepare_entry(value) {
            Ok(entry) => entry,
            Err(reason) => {
                debug!(index, ?raw_id, %reason, "Skipping malformed dictionary entry");
                report.skipped.push(EntryIssue { index, id: raw_id, reason });
                continue;
            }
        };

        if !seen.insert(entry.id.clone()) || store.contains(&entry.id) {
            debug!(index, id = %entry.id, "Skipping duplicate dictionary entry");
            report.skipped.push(EntryIssue {
                index,
                id: Some(entry.id),
                reason: "duplicate id".to_string(),
            });
            continue;
        }

        let id = entry.id.clone();
        match store.insert(entry) {
            Ok(()) => report.installed += 1,
            Err(e) => report.errors.push(EntryIssue { index, id: Some(id), reason: e.to_string() }),
        }
    }

    info!(
        installed = report.installed,
        skipped = report.skipped.len(),
        errors = report.errors.len(),
        "Dictionary install finished"
    );
    report
}

/// Decode, validate and normalize one raw entry
fn prepare_entry(value: Value) -> Result<WordEntry, String> {
    let mut entry: WordEntry =
        serde_json::from_value(value).map_err(|e| format!("malformed entry: {}", e))?;

    if let Some(problem) = entry.validation_problem() {
        return Err(problem);
    }

    entry.source_language = normalize_language(&entry.source_language).map_err(|e| e.to_string())?;
    entry.target_language = normalize_language(&entry.target_language).map_err(|e| e.to_string())?;
    Ok(entry)
}
