//! Dictionary provider trait
//!
//! This module defines the `DictionaryProvider` trait for provider abstraction,
//! so the processing pipeline can run against an in-memory dictionary, a
//! remote service or a test double without knowing which one it has.

use std::sync::Arc;

use async_trait::async_trait;

use crate::dictionary::LookupTable;
use crate::error::DictionaryResult;
use crate::models::LanguagePair;

/// Generic trait for word-translation dictionaries
///
/// All methods are async to support I/O-bound providers.
#[async_trait]
pub trait DictionaryProvider: Send + Sync {
    /// Prepare the provider for lookups (open connections, warm indexes)
    ///
    /// Providers with nothing to prepare keep the default no-op.
    async fn initialize(&self) -> DictionaryResult<()> {
        Ok(())
    }

    /// Look up a batch of normalized words for a language pair
    ///
    /// # Guarantees
    ///
    /// - Every word in `words` is a key of the returned table
    /// - A word with no entry maps to `None`
    /// - When several entries match one word, the one with the lowest
    ///   frequency rank is returned
    async fn lookup_words(
        &self,
        words: &[String],
        languages: &LanguagePair,
    ) -> DictionaryResult<LookupTable>;

    /// Name of this provider, used in logs
    fn provider_name(&self) -> &str;
}

#[async_trait]
impl<P: DictionaryProvider + ?Sized> DictionaryProvider for Arc<P> {
    async fn initialize(&self) -> DictionaryResult<()> {
        (**self).initialize().await
    }

    async fn lookup_words(
        &self,
        words: &[String],
        languages: &LanguagePair,
    ) -> DictionaryResult<LookupTable> {
        (**self).lookup_words(words, languages).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}
