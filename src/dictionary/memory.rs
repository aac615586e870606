//! In-memory dictionary indexed by language pair and normalized word form

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::dictionary::install::DictionaryStore;
use crate::dictionary::provider::DictionaryProvider;
use crate::dictionary::LookupTable;
use crate::error::{DictionaryError, DictionaryResult, StorageError, StorageResult};
use crate::models::{LanguagePair, WordEntry};

#[derive(Debug, Default)]
struct Index {
    /// Entries by id
    entries: HashMap<String, WordEntry>,
    /// Normalized source word or variant -> ids of the entries carrying it
    forms: HashMap<LanguagePair, HashMap<String, Vec<String>>>,
}

impl Index {
    fn best_match(&self, languages: &LanguagePair, word: &str) -> Option<&WordEntry> {
        self.forms
            .get(languages)?
            .get(word)?
            .iter()
            .filter_map(|id| self.entries.get(id))
            .reduce(|best, candidate| if candidate.preferred_over(best) { candidate } else { best })
    }
}

/// Dictionary held entirely in memory
///
/// Entries go in through [`crate::dictionary::install_entries`] and are never
/// modified afterwards. An optional capacity bounds the number of entries.
#[derive(Debug, Default)]
pub struct InMemoryDictionary {
    index: RwLock<Index>,
    capacity: Option<usize>,
}

impl InMemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self { index: RwLock::default(), capacity: Some(capacity) }
    }

    pub fn len(&self) -> usize {
        self.index.read().map(|index| index.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<WordEntry> {
        self.index.read().ok()?.entries.get(id).cloned()
    }

    /// Snapshot of every entry, sorted by id
    pub fn entries(&self) -> Vec<WordEntry> {
        let mut entries: Vec<WordEntry> = self
            .index
            .read()
            .map(|index| index.entries.values().cloned().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }

    /// Language pairs with at least one entry
    pub fn language_pairs(&self) -> Vec<LanguagePair> {
        self.index
            .read()
            .map(|index| index.forms.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl DictionaryStore for InMemoryDictionary {
    fn contains(&self, id: &str) -> bool {
        self.index.read().map(|index| index.entries.contains_key(id)).unwrap_or(false)
    }

    fn insert(&self, entry: WordEntry) -> StorageResult<()> {
        let mut index = self
            .index
            .write()
            .map_err(|_| StorageError::Io("dictionary index lock poisoned".to_string()))?;

        if index.entries.contains_key(&entry.id) {
            return Err(StorageError::Duplicate(entry.id));
        }
        if let Some(capacity) = self.capacity {
            if index.entries.len() >= capacity {
                return Err(StorageError::CapacityExceeded(capacity));
            }
        }

        let forms = index.forms.entry(entry.language_pair()).or_default();
        let mut normalized: Vec<String> = entry.normalized_forms().collect();
        normalized.sort();
        normalized.dedup();
        for form in normalized {
            forms.entry(form).or_default().push(entry.id.clone());
        }
        index.entries.insert(entry.id.clone(), entry);
        Ok(())
    }
}

#[async_trait]
impl DictionaryProvider for InMemoryDictionary {
    async fn lookup_words(
        &self,
        words: &[String],
        languages: &LanguagePair,
    ) -> DictionaryResult<LookupTable> {
        let index = self
            .index
            .read()
            .map_err(|_| DictionaryError::Lookup("dictionary index lock poisoned".to_string()))?;

        Ok(words
            .iter()
            .map(|word| (word.clone(), index.best_match(languages, word).cloned()))
            .collect())
    }

    fn provider_name(&self) -> &str {
        "In-Memory Dictionary"
    }
}
