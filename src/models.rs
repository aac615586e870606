//! Core data types shared by the annotation pipeline and the review scheduler
//!
//! Records that cross a storage or wire boundary are explicit serde structs with
//! camelCase field names, so dictionary files and vocabulary snapshots keep the
//! same shape the reader applications exchange.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use icu_locale::Locale;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigError, ConfigResult};
use crate::vocabulary::scheduler::{INITIAL_EASE_FACTOR, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR};

/// The learner's declared skill tier
///
/// Ordered: `Beginner < Intermediate < Advanced`. An entry is eligible for
/// substitution when its level is at or below the configured ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ProficiencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProficiencyLevel::Beginner => "beginner",
            ProficiencyLevel::Intermediate => "intermediate",
            ProficiencyLevel::Advanced => "advanced",
        }
    }
}

impl Default for ProficiencyLevel {
    fn default() -> Self {
        ProficiencyLevel::Beginner
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProficiencyLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(ProficiencyLevel::Beginner),
            "intermediate" => Ok(ProficiencyLevel::Intermediate),
            "advanced" => Ok(ProficiencyLevel::Advanced),
            other => Err(ConfigError::InvalidProficiency(other.to_string())),
        }
    }
}

/// Normalize a language code to its lowercase base language subtag
///
/// The code is parsed as a BCP-47 locale identifier and only the language
/// subtag is kept:
/// - `en-US` → `en`
/// - `zh-Hans` → `zh`
/// - `es` → `es`
pub fn normalize_language(code: &str) -> ConfigResult<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidLanguage("language code is empty".to_string()));
    }

    let locale: Locale = trimmed
        .parse()
        .map_err(|e| ConfigError::InvalidLanguage(format!("{}: {:?}", trimmed, e)))?;

    let language = locale.id.language.as_str().to_lowercase();
    if language == "und" {
        return Err(ConfigError::InvalidLanguage(format!(
            "{}: undetermined language",
            trimmed
        )));
    }
    Ok(language)
}

/// A (source, target) language pair, both normalized base language codes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: &str, target: &str) -> ConfigResult<Self> {
        Ok(Self {
            source: normalize_language(source)?,
            target: normalize_language(target)?,
        })
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.source, self.target)
    }
}

/// Normalized form used for every dictionary comparison
pub fn normalize_word(word: &str) -> String {
    word.to_lowercase()
}

/// A single dictionary translation entry
///
/// Entries are immutable once installed into a dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub id: String,
    pub source_word: String,
    pub target_word: String,
    pub source_language: String,
    pub target_language: String,
    pub proficiency_level: ProficiencyLevel,
    pub frequency_rank: u32,
    #[serde(default)]
    pub part_of_speech: String,
    /// Alternate inflected forms of the source word, in dictionary order
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
}

impl WordEntry {
    /// True when `normalized` equals the source word or one of its variants
    pub fn matches(&self, normalized: &str) -> bool {
        self.normalized_forms().any(|form| form == normalized)
    }

    /// Normalized source word followed by normalized variants
    pub fn normalized_forms(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(normalize_word(&self.source_word))
            .chain(self.variants.iter().map(|v| normalize_word(v)))
    }

    /// The entry's languages normalized the same way as [`LanguagePair::new`]
    ///
    /// Codes that do not parse as a locale fall back to their lowercase form.
    pub fn language_pair(&self) -> LanguagePair {
        let normalize = |code: &str| normalize_language(code).unwrap_or_else(|_| code.trim().to_lowercase());
        LanguagePair {
            source: normalize(&self.source_language),
            target: normalize(&self.target_language),
        }
    }

    /// Reason the entry cannot be installed, if any
    pub fn validation_problem(&self) -> Option<String> {
        if self.id.trim().is_empty() {
            return Some("id is empty".to_string());
        }
        if self.source_word.trim().is_empty() {
            return Some("sourceWord is empty".to_string());
        }
        if self.target_word.trim().is_empty() {
            return Some("targetWord is empty".to_string());
        }
        if self.source_language.trim().is_empty() || self.target_language.trim().is_empty() {
            return Some("language code is empty".to_string());
        }
        if self.variants.iter().any(|v| v.trim().is_empty()) {
            return Some("variant is empty".to_string());
        }
        None
    }

    /// Ordering used when several entries match one word: most common first, then by id
    pub fn preferred_over(&self, other: &WordEntry) -> bool {
        (self.frequency_rank, &self.id) < (other.frequency_rank, &other.id)
    }
}

/// A substitution made in one processing call
///
/// Offsets are byte offsets into the processed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignWordRecord {
    pub original_word: String,
    pub foreign_word: String,
    pub start_index: usize,
    pub end_index: usize,
    pub word_entry: WordEntry,
}

/// Summary counters for one processing call
///
/// `eligible_words` and `replaced_words` count distinct normalized words;
/// `total_words` counts every word segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    pub total_words: usize,
    pub eligible_words: usize,
    pub replaced_words: usize,
    #[serde(rename = "processingTimeMs", with = "duration_millis")]
    pub processing_time: Duration,
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// Learning state of a saved word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyStatus {
    New,
    Learning,
    Review,
    Learned,
}

impl VocabularyStatus {
    /// Position in the due queue; lower comes first
    pub fn queue_priority(&self) -> u8 {
        match self {
            VocabularyStatus::New => 0,
            VocabularyStatus::Learning => 1,
            VocabularyStatus::Review => 2,
            VocabularyStatus::Learned => 3,
        }
    }
}

impl fmt::Display for VocabularyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VocabularyStatus::New => "new",
            VocabularyStatus::Learning => "learning",
            VocabularyStatus::Review => "review",
            VocabularyStatus::Learned => "learned",
        };
        f.write_str(name)
    }
}

/// A word the learner saved for review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub id: String,
    pub source_word: String,
    pub target_word: String,
    pub source_language: String,
    pub target_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_sentence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub review_count: u32,
    pub ease_factor: f64,
    /// Days until the next review
    pub interval: u32,
    pub status: VocabularyStatus,
}

impl VocabularyItem {
    /// Create a fresh `new` item from a substitution the learner chose to save
    pub fn from_record(
        record: &ForeignWordRecord,
        context_sentence: Option<String>,
        book_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let entry = &record.word_entry;
        Self {
            id: Uuid::new_v4().to_string(),
            source_word: entry.source_word.clone(),
            target_word: entry.target_word.clone(),
            source_language: entry.source_language.clone(),
            target_language: entry.target_language.clone(),
            context_sentence,
            book_id,
            added_at: now,
            last_reviewed_at: None,
            review_count: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            interval: 0,
            status: VocabularyStatus::New,
        }
    }

    /// Create a `new` item directly from a word pair
    pub fn new(
        source_word: &str,
        target_word: &str,
        languages: &LanguagePair,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_word: source_word.to_string(),
            target_word: target_word.to_string(),
            source_language: languages.source.clone(),
            target_language: languages.target.clone(),
            context_sentence: None,
            book_id: None,
            added_at: now,
            last_reviewed_at: None,
            review_count: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            interval: 0,
            status: VocabularyStatus::New,
        }
    }

    /// Timestamp the ordering of the due queue is based on
    pub fn recency_anchor(&self) -> DateTime<Utc> {
        self.last_reviewed_at.unwrap_or(self.added_at)
    }

    /// Reason a stored item cannot be graded, if any
    pub fn validation_problem(&self) -> Option<String> {
        if self.id.trim().is_empty() {
            return Some("id is empty".to_string());
        }
        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE_FACTOR {
            return Some(format!("easeFactor {} is below {}", self.ease_factor, MIN_EASE_FACTOR));
        }
        if self.interval > MAX_INTERVAL_DAYS {
            return Some(format!("interval {} exceeds {} days", self.interval, MAX_INTERVAL_DAYS));
        }
        None
    }
}
