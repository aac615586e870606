//! Dictionary providers and the installation path for dictionary data
//!
//! The pipeline only talks to a [`DictionaryProvider`]: one batched
//! `lookup_words` call per processed content unit. Everything else in this
//! module is a provider implementation or glue around one:
//!
//! 1. **InMemoryDictionary** - indexed entries, filled through [`install_entries`]
//! 2. **CachedDictionary** - LRU layer that only forwards cache misses
//! 3. **RemoteDictionary** - HTTP provider for a hosted dictionary service
//! 4. **MockDictionary** - deterministic provider for tests
//!
//! # Example
//!
//! ```ignore
//! use xenolexia::dictionary::{CachedDictionary, DictionaryProvider, InMemoryDictionary, load_dictionary_file};
//! use xenolexia::models::LanguagePair;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dictionary = InMemoryDictionary::new();
//!     let report = load_dictionary_file("en-es.json".as_ref(), &dictionary)?;
//!     println!("installed {} entries", report.installed);
//!
//!     let cached = CachedDictionary::new(dictionary, 10_000);
//!     let pair = LanguagePair::new("en", "es")?;
//!     let found = cached.lookup_words(&["house".to_string()], &pair).await?;
//!     println!("{:?}", found["house"]);
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;

use crate::models::WordEntry;

pub mod cache;
pub mod install;
pub mod loader;
pub mod memory;
pub mod mock;
pub mod provider;
pub mod remote;

/// Result of a batched lookup: every requested normalized word maps to its
/// entry, or to `None` when the dictionary has nothing for it
pub type LookupTable = HashMap<String, Option<WordEntry>>;

pub use cache::CachedDictionary;
pub use install::{DictionaryStore, EntryIssue, InstallReport, install_entries};
pub use loader::{load_dictionary_file, parse_dictionary_json};
pub use memory::InMemoryDictionary;
pub use mock::{MockDictionary, MockMode};
pub use provider::DictionaryProvider;
pub use remote::RemoteDictionary;
