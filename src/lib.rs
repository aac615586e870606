//! Xenolexia: learn a language while reading
//!
//! Rewrites a fraction of the words in a text into the language being learned,
//! scaled to the reader's proficiency, and schedules the words they save for
//! spaced-repetition review.
//!
//! ```ignore
//! use xenolexia::{ContentProcessor, InMemoryDictionary, ProcessingOptions};
//!
//! let processor = ContentProcessor::new(InMemoryDictionary::new(), &ProcessingOptions::default())?;
//! let outcome = processor.process_content("<p>The house is big.</p>").await;
//! ```

pub mod config;
pub mod dictionary;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod renderer;
pub mod selector;
pub mod tokenizer;
pub mod vocabulary;

pub use config::AppConfig;
pub use dictionary::{
    CachedDictionary, DictionaryProvider, InMemoryDictionary, InstallReport, MockDictionary,
    MockMode, RemoteDictionary,
};
pub use error::{ConfigError, DictionaryError, ReviewError, StorageError};
pub use models::{
    ForeignWordRecord, LanguagePair, ProcessingStats, ProficiencyLevel, VocabularyItem,
    VocabularyStatus, WordEntry,
};
pub use pipeline::{ContentProcessor, ProcessedContent, ProcessingOptions, ProcessingOutcome};
pub use renderer::RenderMode;
pub use vocabulary::{
    InMemoryVocabulary, JsonFileVocabulary, VocabularyRepository, VocabularyService,
    VocabularyStats,
};
