//! Content processing pipeline
//!
//! Turns a content unit into annotated content by chaining the pieces of the
//! crate:
//!
//! 1. **Tokenize** - lossless word / non-word segmentation
//! 2. **Lookup** - one batched dictionary call for the distinct normalized words
//! 3. **Select** - eligibility plus density budget
//! 4. **Render** - substitute the chosen words, pass everything else through
//!
//! A dictionary failure never reaches the caller as an error. The processor
//! returns [`ProcessingOutcome::Degraded`] carrying the original content.
//!
//! # Example
//!
//! ```ignore
//! use xenolexia::dictionary::InMemoryDictionary;
//! use xenolexia::pipeline::{ContentProcessor, ProcessingOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ProcessingOptions { density: 1.0, ..ProcessingOptions::default() };
//!     let processor = ContentProcessor::new(InMemoryDictionary::new(), &options)?;
//!
//!     let outcome = processor.process_content("The house is big.").await;
//!     println!("{}", outcome.content());
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dictionary::DictionaryProvider;
use crate::error::{ConfigResult, DictionaryError};
use crate::models::{ForeignWordRecord, LanguagePair, ProcessingStats, ProficiencyLevel, normalize_word};
use crate::renderer::{RenderMode, SubstitutionRenderer};
use crate::selector::WordSelector;
use crate::tokenizer::{Segment, tokenize};


/// Per-processor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingOptions {
    pub source_language: String,
    pub target_language: String,
    /// Highest proficiency level whose entries may be substituted
    pub proficiency_level: ProficiencyLevel,
    /// Fraction of eligible words to substitute, within `[0, 1]`
    pub density: f64,
    pub render_mode: RenderMode,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            proficiency_level: ProficiencyLevel::Beginner,
            density: 0.3,
            render_mode: RenderMode::Markup,
        }
    }
}

/// Annotated content from a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedContent {
    pub content: String,
    pub foreign_words: Vec<ForeignWordRecord>,
    pub stats: ProcessingStats,
}

/// Result of [`ContentProcessor::process_content`]
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    Transformed(ProcessedContent),
    /// The dictionary could not be consulted; `content` is the input unchanged
    Degraded { content: String, reason: DictionaryError },
}

impl ProcessingOutcome {
    pub fn content(&self) -> &str {
        match self {
            ProcessingOutcome::Transformed(processed) => &processed.content,
            ProcessingOutcome::Degraded { content, .. } => content,
        }
    }

    pub fn foreign_words(&self) -> &[ForeignWordRecord] {
        match self {
            ProcessingOutcome::Transformed(processed) => &processed.foreign_words,
            ProcessingOutcome::Degraded { .. } => &[],
        }
    }

    /// Stats of the run; all zero for a degraded outcome
    pub fn stats(&self) -> ProcessingStats {
        match self {
            ProcessingOutcome::Transformed(processed) => processed.stats,
            ProcessingOutcome::Degraded { .. } => ProcessingStats::default(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ProcessingOutcome::Degraded { .. })
    }

    pub fn degradation_reason(&self) -> Option<&DictionaryError> {
        match self {
            ProcessingOutcome::Degraded { reason, .. } => Some(reason),
            ProcessingOutcome::Transformed(_) => None,
        }
    }

    /// Flatten into content, records and stats, whichever way the run went
    pub fn into_processed(self) -> ProcessedContent {
        match self {
            ProcessingOutcome::Transformed(processed) => processed,
            ProcessingOutcome::Degraded { content, .. } => ProcessedContent {
                content,
                foreign_words: Vec::new(),
                stats: ProcessingStats::default(),
            },
        }
    }
}

/// Processing entry point, bound to one provider and one set of options
///
/// Holds no mutable state, so one processor can serve concurrent calls.
#[derive(Debug)]
pub struct ContentProcessor<P> {
    provider: P,
    languages: LanguagePair,
    selector: WordSelector,
    renderer: SubstitutionRenderer,
}

impl<P: DictionaryProvider> ContentProcessor<P> {
    /// Build a processor, validating languages and density up front
    ///
    /// # Arguments
    ///
    /// * `provider` - Dictionary consulted once per [`process_content`](Self::process_content) call
    /// * `options` - Language pair, proficiency ceiling, density and render mode
    ///
    /// # Returns
    ///
    /// * `Ok(ContentProcessor)` - Ready to serve any number of concurrent calls
    /// * `Err(ConfigError)` - If a language code does not parse or density is outside `[0, 1]`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let options = ProcessingOptions { target_language: "de".to_string(), ..Default::default() };
    /// let processor = ContentProcessor::new(MockDictionary::new(MockMode::Empty), &options)?;
    /// assert_eq!(processor.languages().target, "de");
    /// ```
    pub fn new(provider: P, options: &ProcessingOptions) -> ConfigResult<Self> {
        Ok(Self {
            provider,
            languages: LanguagePair::new(&options.source_language, &options.target_language)?,
            selector: WordSelector::new(options.proficiency_level, options.density)?,
            renderer: SubstitutionRenderer::new(options.render_mode),
        })
    }

    /// The wrapped dictionary provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Normalized language pair every lookup is made for
    pub fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    pub fn selector(&self) -> &WordSelector {
        &self.selector
    }

    /// Annotate one content unit
    ///
    /// Performs at most one dictionary round-trip; none when the content has no
    /// words.
    ///
    /// # Arguments
    ///
    /// * `content` - Plain text or HTML; markup passes through untouched
    ///
    /// # Returns
    ///
    /// * `ProcessingOutcome::Transformed` - Annotated content, one record per substituted occurrence, and stats
    /// * `ProcessingOutcome::Degraded` - The input unchanged, when the dictionary lookup failed
    ///
    /// # Example
    ///
    /// ```ignore
    /// let outcome = processor.process_content("The house is big.").await;
    /// if !outcome.is_degraded() {
    ///     println!("{} words replaced", outcome.stats().replaced_words);
    /// }
    /// ```
    pub async fn process_content(&self, content: &str) -> ProcessingOutcome {
        let start = Instant::now();
        let segments = tokenize(content);
        let words = distinct_words(&segments);

        let lookup = if words.is_empty() {
            Default::default()
        } else {
            match self.provider.lookup_words(&words, &self.languages).await {
                Ok(lookup) => lookup,
                Err(reason) => {
                    warn!(
                        provider = self.provider.provider_name(),
                        languages = %self.languages,
                        error = %reason,
                        "Dictionary lookup failed, returning content unchanged"
                    );
                    return ProcessingOutcome::Degraded { content: content.to_string(), reason };
                }
            }
        };

        let selection = self.selector.select(&segments, &lookup);
        let rendered = self.renderer.render(&segments, &selection);

        let stats = ProcessingStats {
            total_words: selection.total_words,
            eligible_words: selection.eligible_words,
            replaced_words: selection.replaced_words(),
            processing_time: start.elapsed(),
        };
        debug!(
            total = stats.total_words,
            eligible = stats.eligible_words,
            replaced = stats.replaced_words,
            "Processed content unit"
        );

        ProcessingOutcome::Transformed(ProcessedContent {
            content: rendered.content,
            foreign_words: rendered.foreign_words,
            stats,
        })
    }
}

/// Distinct normalized words in order of first appearance
fn distinct_words(segments: &[Segment<'_>]) -> Vec<String> {
    let mut seen = HashSet::new();
    segments
        .iter()
        .filter(|s| s.is_word())
        .map(|s| normalize_word(s.text))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{MockDictionary, MockMode};
    use crate::error::ConfigError;

    #[test]
    fn test_distinct_words_preserve_first_appearance() {
        let segments = tokenize("The cat saw the Cat and THE dog");
        assert_eq!(distinct_words(&segments), vec!["the", "cat", "saw", "and", "dog"]);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ProcessingOptions = serde_json::from_str(r#"{"density": 0.5}"#).unwrap();
        assert_eq!(options.density, 0.5);
        assert_eq!(options.source_language, "en");
        assert_eq!(options.render_mode, RenderMode::Markup);
    }

    #[test]
    fn test_constructor_validates_options() {
        let bad_density = ProcessingOptions { density: 2.0, ..Default::default() };
        assert!(matches!(
            ContentProcessor::new(MockDictionary::new(MockMode::Empty), &bad_density),
            Err(ConfigError::InvalidDensity(_))
        ));

        let bad_language = ProcessingOptions { target_language: "??".to_string(), ..Default::default() };
        assert!(matches!(
            ContentProcessor::new(MockDictionary::new(MockMode::Empty), &bad_language),
            Err(ConfigError::InvalidLanguage(_))
        ));
    }

    #[tokio::test]
    async fn test_no_words_means_no_lookup() {
        let processor =
            ContentProcessor::new(MockDictionary::new(MockMode::Empty), &ProcessingOptions::default())
                .unwrap();
        let outcome = processor.process_content("123 -- <br/>").await;
        assert_eq!(outcome.content(), "123 -- <br/>");
        assert_eq!(processor.provider().lookup_calls(), 0);
        assert!(!outcome.is_degraded());
    }

    #[test]
    fn test_degraded_outcome_accessors() {
        let outcome = ProcessingOutcome::Degraded {
            content: "text".to_string(),
            reason: DictionaryError::Lookup("down".to_string()),
        };
        assert!(outcome.is_degraded());
        assert!(outcome.foreign_words().is_empty());
        assert_eq!(outcome.stats(), ProcessingStats::default());
        assert!(matches!(outcome.degradation_reason(), Some(DictionaryError::Lookup(_))));

        let processed = outcome.into_processed();
        assert_eq!(processed.content, "text");
    }
}
