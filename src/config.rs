//! Application configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. a JSON config file (missing file = defaults)
//! 3. `XENOLEXIA_*` environment variables
//! 4. command-line flags, applied by the binaries themselves
//!
//! ```json
//! {
//!   "processing": { "sourceLanguage": "en", "targetLanguage": "de", "density": 0.2 },
//!   "dictionaryPath": "dictionaries/en-de.json",
//!   "vocabularyPath": "vocabulary.json",
//!   "cacheCapacity": 5000
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dictionary::remote::{ENDPOINT_ENV, TOKEN_ENV};
use crate::dictionary::{
    CachedDictionary, DictionaryProvider, InMemoryDictionary, RemoteDictionary, load_dictionary_file,
};
use crate::error::{ConfigError, ConfigResult, DictionaryResult, StorageResult};
use crate::models::{LanguagePair, ProficiencyLevel};
use crate::pipeline::ProcessingOptions;
use crate::selector::validate_density;
use crate::vocabulary::{InMemoryVocabulary, JsonFileVocabulary, VocabularyRepository};

pub const SOURCE_LANGUAGE_ENV: &str = "XENOLEXIA_SOURCE_LANGUAGE";
pub const TARGET_LANGUAGE_ENV: &str = "XENOLEXIA_TARGET_LANGUAGE";
pub const PROFICIENCY_ENV: &str = "XENOLEXIA_PROFICIENCY";
pub const DENSITY_ENV: &str = "XENOLEXIA_DENSITY";
pub const DICTIONARY_URL_ENV: &str = ENDPOINT_ENV;

/// Default number of per-word lookups kept by the dictionary cache
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub processing: ProcessingOptions,
    /// Dictionary JSON file loaded into the in-memory dictionary at startup
    pub dictionary_path: Option<PathBuf>,
    /// Vocabulary snapshot file; in-memory only when unset
    pub vocabulary_path: Option<PathBuf>,
    pub cache_capacity: usize,
    /// When set, lookups go to this HTTP dictionary service instead of the local file
    pub remote_dictionary_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            processing: ProcessingOptions::default(),
            dictionary_path: None,
            vocabulary_path: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            remote_dictionary_url: None,
        }
    }
}

impl AppConfig {
    /// Load from `path` (if given and present), apply the environment, validate
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = serde_json::from_str(&content)
                    .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
                debug!(path = %path.display(), "Loaded configuration file");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    /// Apply `XENOLEXIA_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(source) = get(SOURCE_LANGUAGE_ENV) {
            self.processing.source_language = source;
        }
        if let Some(target) = get(TARGET_LANGUAGE_ENV) {
            self.processing.target_language = target;
        }
        if let Some(level) = get(PROFICIENCY_ENV) {
            self.processing.proficiency_level = level.parse::<ProficiencyLevel>()?;
        }
        if let Some(density) = get(DENSITY_ENV) {
            self.processing.density = density
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::Parse(format!("{} is not a number: {}", DENSITY_ENV, density)))?;
        }
        if let Some(url) = get(DICTIONARY_URL_ENV) {
            self.remote_dictionary_url = Some(url);
        }
        Ok(())
    }

    /// Check the processing options without building a processor
    pub fn validate(&self) -> ConfigResult<()> {
        validate_density(self.processing.density)?;
        LanguagePair::new(&self.processing.source_language, &self.processing.target_language)?;
        Ok(())
    }

    pub fn languages(&self) -> ConfigResult<LanguagePair> {
        LanguagePair::new(&self.processing.source_language, &self.processing.target_language)
    }

    /// Build the dictionary provider this configuration describes
    ///
    /// The remote service wins when a URL is set; otherwise the dictionary file
    /// (if any) is loaded into memory. Either way lookups go through an LRU cache.
    pub async fn build_dictionary(&self) -> DictionaryResult<Arc<dyn DictionaryProvider>> {
        let provider: Arc<dyn DictionaryProvider> = match &self.remote_dictionary_url {
            Some(url) => Arc::new(CachedDictionary::new(
                RemoteDictionary::new(url.clone(), std::env::var(TOKEN_ENV).ok())?,
                self.cache_capacity,
            )),
            None => Arc::new(CachedDictionary::new(self.load_local_dictionary()?, self.cache_capacity)),
        };
        provider.initialize().await?;
        info!(provider = provider.provider_name(), "Dictionary ready");
        Ok(provider)
    }

    /// The configured dictionary file loaded into memory; empty when no file is configured
    pub fn load_local_dictionary(&self) -> DictionaryResult<InMemoryDictionary> {
        let dictionary = InMemoryDictionary::new();
        if let Some(path) = self.dictionary_path.as_deref().filter(|p| p.exists()) {
            let report = load_dictionary_file(path, &dictionary)?;
            debug!(path = %path.display(), installed = report.installed, "Loaded dictionary file");
        }
        Ok(dictionary)
    }

    /// Open the configured vocabulary store; in memory when no path is set
    pub async fn open_vocabulary(&self) -> StorageResult<Arc<dyn VocabularyRepository>> {
        Ok(match &self.vocabulary_path {
            Some(path) => Arc::new(JsonFileVocabulary::open(path).await?),
            None => Arc::new(InMemoryVocabulary::new()),
        })
    }
}
