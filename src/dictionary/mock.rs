//! Mock dictionary provider for testing
//!
//! Deterministic and network-free. Besides answering lookups it records how
//! many batch lookups it served and which words the last batch asked for, so
//! tests can assert that callers batch their requests.
//!
//! # Example
//!
//! ```ignore
//! use xenolexia::dictionary::{DictionaryProvider, MockDictionary, MockMode};
//!
//! #[tokio::test]
//! async fn test_lookup() {
//!     let mock = MockDictionary::new(MockMode::Empty);
//!     let pair = LanguagePair::new("en", "es").unwrap();
//!     let table = mock.lookup_words(&["house".to_string()], &pair).await.unwrap();
//!     assert_eq!(table["house"], None);
//!     assert_eq!(mock.lookup_calls(), 1);
//! }
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::dictionary::provider::DictionaryProvider;
use crate::dictionary::LookupTable;
use crate::error::{DictionaryError, DictionaryResult};
use crate::models::{LanguagePair, WordEntry};

/// Mock lookup modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Answer from a fixed list of entries, matched by source word or variant
    Entries(Vec<WordEntry>),
    /// Every lookup fails with this message
    Error(String),
    /// Nothing is ever found
    Empty,
}

#[derive(Debug)]
pub struct MockDictionary {
    mode: MockMode,
    /// Optional simulated latency (in milliseconds)
    delay_ms: u64,
    calls: AtomicUsize,
    last_request: Mutex<Vec<String>>,
}

impl MockDictionary {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, 0)
    }

    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self { mode, delay_ms, calls: AtomicUsize::new(0), last_request: Mutex::new(Vec::new()) }
    }

    /// Number of `lookup_words` calls served so far
    pub fn lookup_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Words requested by the most recent `lookup_words` call
    pub fn last_request(&self) -> Vec<String> {
        self.last_request.lock().map(|words| words.clone()).unwrap_or_default()
    }

    fn find(entries: &[WordEntry], word: &str, languages: &LanguagePair) -> Option<WordEntry> {
        entries
            .iter()
            .filter(|e| &e.language_pair() == languages && e.matches(word))
            .reduce(|best, candidate| if candidate.preferred_over(best) { candidate } else { best })
            .cloned()
    }
}

#[async_trait]
impl DictionaryProvider for MockDictionary {
    async fn lookup_words(
        &self,
        words: &[String],
        languages: &LanguagePair,
    ) -> DictionaryResult<LookupTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = words.to_vec();
        }

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        match &self.mode {
            MockMode::Entries(entries) => Ok(words
                .iter()
                .map(|w| (w.clone(), Self::find(entries, w, languages)))
                .collect()),
            MockMode::Error(message) => Err(DictionaryError::Lookup(message.clone())),
            MockMode::Empty => Ok(words.iter().map(|w| (w.clone(), None)).collect()),
        }
    }

    fn provider_name(&self) -> &str {
        "Mock Dictionary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProficiencyLevel;

    fn entry(id: &str, source: &str, rank: u32) -> WordEntry {
        WordEntry {
            id: id.to_string(),
            source_word: source.to_string(),
            target_word: format!("{}_es", source),
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            proficiency_level: ProficiencyLevel::Beginner,
            frequency_rank: rank,
            part_of_speech: String::new(),
            variants: Vec::new(),
            pronunciation: None,
        }
    }

    fn en_es() -> LanguagePair {
        LanguagePair::new("en", "es").unwrap()
    }

    #[tokio::test]
    async fn test_entries_mode_finds_preferred_entry() {
        let mock = MockDictionary::new(MockMode::Entries(vec![entry("b", "bank", 90), entry("a", "bank", 5)]));
        let table = mock.lookup_words(&["bank".to_string()], &en_es()).await.unwrap();
        assert_eq!(table["bank"].as_ref().map(|e| e.id.as_str()), Some("a"));
    }

    #[tokio::test]
    async fn test_entries_mode_normalizes_entry_languages() {
        let mut tagged = entry("a", "house", 10);
        tagged.source_language = "en-GB".to_string();
        let mock = MockDictionary::new(MockMode::Entries(vec![tagged]));
        let table = mock.lookup_words(&["house".to_string()], &en_es()).await.unwrap();
        assert_eq!(table["house"].as_ref().map(|e| e.id.as_str()), Some("a"));
    }

    #[tokio::test]
    async fn test_error_mode() {
        let mock = MockDictionary::new(MockMode::Error("offline".to_string()));
        let result = mock.lookup_words(&["house".to_string()], &en_es()).await;
        assert_eq!(result, Err(DictionaryError::Lookup("offline".to_string())));
        assert_eq!(mock.lookup_calls(), 1);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let mock = MockDictionary::new(MockMode::Empty);
        let words = vec!["a".to_string(), "b".to_string()];
        mock.lookup_words(&words, &en_es()).await.unwrap();
        assert_eq!(mock.last_request(), words);
    }

    #[tokio::test]
    async fn test_delay_adds_latency() {
        let mock = MockDictionary::with_delay(MockMode::Empty, 30);
        let start = std::time::Instant::now();
        mock.lookup_words(&["a".to_string()], &en_es()).await.unwrap();
        assert!(start.elapsed().as_millis() >= 30);
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(MockDictionary::new(MockMode::Empty).provider_name(), "Mock Dictionary");
    }
}
