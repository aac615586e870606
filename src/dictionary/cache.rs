//! LRU caching layer over any dictionary provider
//!
//! Both hits and misses are cached per (language pair, word), so a word the
//! dictionary does not know is not asked for again. A batch lookup forwards
//! only the uncached words to the inner provider, in a single call. Failed
//! lookups are never cached.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use lru::LruCache;
use tracing::debug;

use crate::dictionary::provider::DictionaryProvider;
use crate::dictionary::LookupTable;
use crate::error::DictionaryResult;
use crate::models::{LanguagePair, WordEntry};

type CacheKey = (LanguagePair, String);

pub struct CachedDictionary<P> {
    inner: P,
    cache: Mutex<LruCache<CacheKey, Option<WordEntry>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: DictionaryProvider> CachedDictionary<P> {
    /// Wrap `inner` with a cache holding at most `capacity` words (minimum 1)
    pub fn new(inner: P, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Words answered from the cache since creation
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Words forwarded to the inner provider since creation
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached lookup; the hit and miss counters are kept
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// Split `words` into cached results and words still to fetch
    fn partition(&self, words: &[String], languages: &LanguagePair) -> (LookupTable, Vec<String>) {
        let mut found = LookupTable::new();
        let mut missing = Vec::new();
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        for word in words {
            if found.contains_key(word) || missing.contains(word) {
                continue;
            }
            match cache.get(&(languages.clone(), word.clone())) {
                Some(cached) => {
                    found.insert(word.clone(), cached.clone());
                }
                None => missing.push(word.clone()),
            }
        }
        (found, missing)
    }

    fn remember(&self, languages: &LanguagePair, fetched: &LookupTable) {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for (word, entry) in fetched {
            cache.put((languages.clone(), word.clone()), entry.clone());
        }
    }
}

#[async_trait]
impl<P: DictionaryProvider> DictionaryProvider for CachedDictionary<P> {
    async fn initialize(&self) -> DictionaryResult<()> {
        self.inner.initialize().await
    }

    async fn lookup_words(
        &self,
        words: &[String],
        languages: &LanguagePair,
    ) -> DictionaryResult<LookupTable> {
        let (mut found, missing) = self.partition(words, languages);
        self.hits.fetch_add(found.len() as u64, Ordering::Relaxed);
        self.misses.fetch_add(missing.len() as u64, Ordering::Relaxed);
        debug!(
            provider = self.inner.provider_name(),
            hits = found.len(),
            misses = missing.len(),
            "Dictionary cache lookup"
        );

        if missing.is_empty() {
            return Ok(found);
        }

        let mut fetched = self.inner.lookup_words(&missing, languages).await?;
        for word in &missing {
            fetched.entry(word.clone()).or_insert(None);
        }
        self.remember(languages, &fetched);

        found.extend(fetched);
        Ok(found)
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dictionary::{MockDictionary, MockMode};
    use crate::models::ProficiencyLevel;

    fn casa() -> WordEntry {
        WordEntry {
            id: "1".to_string(),
            source_word: "house".to_string(),
            target_word: "casa".to_string(),
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            proficiency_level: ProficiencyLevel::Beginner,
            frequency_rank: 10,
            part_of_speech: String::new(),
            variants: Vec::new(),
            pronunciation: None,
        }
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn en_es() -> LanguagePair {
        LanguagePair::new("en", "es").unwrap()
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let mock = Arc::new(MockDictionary::new(MockMode::Entries(vec![casa()])));
        let cached = CachedDictionary::new(mock.clone(), 100);

        let first = cached.lookup_words(&words(&["house", "tree"]), &en_es()).await.unwrap();
        let second = cached.lookup_words(&words(&["house", "tree"]), &en_es()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(mock.lookup_calls(), 1);
        assert_eq!(cached.hits(), 2);
        assert_eq!(cached.misses(), 2);
        assert_eq!(second["tree"], None);
    }

    #[tokio::test]
    async fn test_only_misses_are_forwarded() {
        let mock = Arc::new(MockDictionary::new(MockMode::Entries(vec![casa()])));
        let cached = CachedDictionary::new(mock.clone(), 100);

        cached.lookup_words(&words(&["house"]), &en_es()).await.unwrap();
        cached.lookup_words(&words(&["house", "dog"]), &en_es()).await.unwrap();

        assert_eq!(mock.lookup_calls(), 2);
        assert_eq!(mock.last_request(), words(&["dog"]));
    }

    #[tokio::test]
    async fn test_language_pair_is_part_of_key() {
        let mock = Arc::new(MockDictionary::new(MockMode::Entries(vec![casa()])));
        let cached = CachedDictionary::new(mock.clone(), 100);
        let en_fr = LanguagePair::new("en", "fr").unwrap();

        cached.lookup_words(&words(&["house"]), &en_es()).await.unwrap();
        let fr = cached.lookup_words(&words(&["house"]), &en_fr).await.unwrap();

        assert_eq!(mock.lookup_calls(), 2);
        assert_eq!(fr["house"], None);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let failing = CachedDictionary::new(MockDictionary::new(MockMode::Error("down".into())), 10);
        assert!(failing.lookup_words(&words(&["house"]), &en_es()).await.is_err());
        assert!(failing.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let mock = Arc::new(MockDictionary::new(MockMode::Empty));
        let cached = CachedDictionary::new(mock.clone(), 2);

        cached.lookup_words(&words(&["a", "b", "c"]), &en_es()).await.unwrap();
        assert_eq!(cached.len(), 2);

        cached.clear();
        assert!(cached.is_empty());
    }
}
