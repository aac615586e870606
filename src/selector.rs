//! Eligibility and density-budgeted selection of words to substitute
//!
//! Selection runs in two phases:
//!
//! 1. **Eligibility** - a word segment is eligible when the dictionary returned
//!    an entry that matches its normalized form (source word or variant) and
//!    whose proficiency level is at or below the configured ceiling.
//! 2. **Budgeting** - exactly `ceil(density × eligible)` distinct normalized
//!    words are chosen, most common (lowest frequency rank) first, ties broken
//!    by first appearance in the content.
//!
//! Once a normalized word is chosen, every occurrence of it in the content is
//! substituted with the same entry and only the first one costs budget. The
//! eligible and replaced counts are therefore counts of distinct normalized
//! words.

use std::collections::HashMap;

use crate::dictionary::LookupTable;
use crate::error::{ConfigError, ConfigResult};
use crate::models::{ProficiencyLevel, WordEntry, normalize_word};
use crate::tokenizer::Segment;

/// Guards `ceil` against products like `0.3 × 10 = 3.0000000000000004`
const BUDGET_EPSILON: f64 = 1e-9;

/// Check that a density lies within `[0, 1]`
pub fn validate_density(density: f64) -> ConfigResult<f64> {
    if density.is_nan() || !(0.0..=1.0).contains(&density) {
        return Err(ConfigError::InvalidDensity(density));
    }
    Ok(density)
}

/// Chooses which words of a content unit get substituted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordSelector {
    ceiling: ProficiencyLevel,
    density: f64,
}

/// Outcome of running the selector over one content unit
#[derive(Debug, Clone, Default)]
pub struct Selection<'e> {
    /// Chosen normalized words and the entry each one is rendered with
    pub chosen: HashMap<String, &'e WordEntry>,
    /// Number of word segments in the content
    pub total_words: usize,
    /// Number of distinct eligible normalized words
    pub eligible_words: usize,
}

impl<'e> Selection<'e> {
    pub fn entry_for(&self, normalized: &str) -> Option<&'e WordEntry> {
        self.chosen.get(normalized).copied()
    }

    /// Number of distinct normalized words chosen for substitution
    pub fn replaced_words(&self) -> usize {
        self.chosen.len()
    }
}

impl WordSelector {
    pub fn new(ceiling: ProficiencyLevel, density: f64) -> ConfigResult<Self> {
        Ok(Self { ceiling, density: validate_density(density)? })
    }

    pub fn ceiling(&self) -> ProficiencyLevel {
        self.ceiling
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Number of distinct words to substitute out of `eligible`
    ///
    /// At least one whenever both the density and `eligible` are non-zero.
    pub fn budget(&self, eligible: usize) -> usize {
        if self.density <= 0.0 || eligible == 0 {
            return 0;
        }
        let raw = (self.density * eligible as f64 - BUDGET_EPSILON).ceil();
        (raw.max(1.0) as usize).min(eligible)
    }

    /// The entry a normalized word qualifies for, if it is eligible
    pub fn eligible_entry<'t>(
        &self,
        normalized: &str,
        lookup: &'t LookupTable,
    ) -> Option<&'t WordEntry> {
        lookup
            .get(normalized)?
            .as_ref()
            .filter(|entry| entry.proficiency_level <= self.ceiling && entry.matches(normalized))
    }

    /// Run eligibility and budgeting over the word segments of one content unit
    pub fn select<'t>(&self, segments: &[Segment<'_>], lookup: &'t LookupTable) -> Selection<'t> {
        // (entry, first occurrence) per distinct eligible word
        let mut candidates: HashMap<String, (&'t WordEntry, usize)> = HashMap::new();
        let mut total_words = 0;

        for segment in segments.iter().filter(|s| s.is_word()) {
            let order = total_words;
            total_words += 1;

            let normalized = normalize_word(segment.text);
            if candidates.contains_key(&normalized) {
                continue;
            }
            if let Some(entry) = self.eligible_entry(&normalized, lookup) {
                candidates.insert(normalized, (entry, order));
            }
        }

        let eligible_words = candidates.len();
        let budget = self.budget(eligible_words);

        let mut ranked: Vec<(String, &'t WordEntry, usize)> = candidates
            .into_iter()
            .map(|(word, (entry, order))| (word, entry, order))
            .collect();
        ranked.sort_by_key(|(_, entry, order)| (entry.frequency_rank, *order));

        let chosen = ranked
            .into_iter()
            .take(budget)
            .map(|(word, entry, _)| (word, entry))
            .collect();

        Selection { chosen, total_words, eligible_words }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn entry(source: &str, target: &str, level: ProficiencyLevel, rank: u32) -> WordEntry {
        WordEntry {
            id: format!("en-es-{}", source),
            source_word: source.to_string(),
            target_word: target.to_string(),
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            proficiency_level: level,
            frequency_rank: rank,
            part_of_speech: String::new(),
            variants: Vec::new(),
            pronunciation: None,
        }
    }

    fn table(entries: Vec<WordEntry>) -> LookupTable {
        entries
            .into_iter()
            .map(|e| (normalize_word(&e.source_word), Some(e)))
            .collect()
    }

    #[test]
    fn test_density_validation() {
        assert!(WordSelector::new(ProficiencyLevel::Beginner, 0.0).is_ok());
        assert!(WordSelector::new(ProficiencyLevel::Beginner, 1.0).is_ok());
        assert!(matches!(
            WordSelector::new(ProficiencyLevel::Beginner, 1.5),
            Err(ConfigError::InvalidDensity(_))
        ));
        assert!(WordSelector::new(ProficiencyLevel::Beginner, -0.1).is_err());
        assert!(WordSelector::new(ProficiencyLevel::Beginner, f64::NAN).is_err());
    }

    #[test]
    fn test_budget_is_ceiling_of_density_fraction() {
        let selector = WordSelector::new(ProficiencyLevel::Advanced, 0.3).unwrap();
        assert_eq!(selector.budget(10), 3);
        assert_eq!(selector.budget(11), 4);
        assert_eq!(selector.budget(1), 1);
        assert_eq!(selector.budget(0), 0);

        let tiny = WordSelector::new(ProficiencyLevel::Beginner, 1e-10).unwrap();
        assert_eq!(tiny.budget(1), 1);
        assert_eq!(tiny.budget(0), 0);

        let none = WordSelector::new(ProficiencyLevel::Advanced, 0.0).unwrap();
        assert_eq!(none.budget(100), 0);

        let all = WordSelector::new(ProficiencyLevel::Advanced, 1.0).unwrap();
        assert_eq!(all.budget(7), 7);
    }

    #[test]
    fn test_proficiency_ceiling_filters_entries() {
        let lookup = table(vec![
            entry("house", "casa", ProficiencyLevel::Beginner, 10),
            entry("ephemeral", "efímero", ProficiencyLevel::Advanced, 9000),
        ]);
        let selector = WordSelector::new(ProficiencyLevel::Intermediate, 1.0).unwrap();
        let segments = tokenize("The ephemeral house");
        let selection = selector.select(&segments, &lookup);

        assert_eq!(selection.total_words, 3);
        assert_eq!(selection.eligible_words, 1);
        assert!(selection.entry_for("house").is_some());
        assert!(selection.entry_for("ephemeral").is_none());
    }

    #[test]
    fn test_missing_entries_are_not_eligible() {
        let mut lookup = table(vec![entry("house", "casa", ProficiencyLevel::Beginner, 10)]);
        lookup.insert("the".to_string(), None);
        let selector = WordSelector::new(ProficiencyLevel::Beginner, 1.0).unwrap();
        let selection = selector.select(&tokenize("the house"), &lookup);
        assert_eq!(selection.eligible_words, 1);
    }

    #[test]
    fn test_lower_frequency_rank_wins_budget() {
        let lookup = table(vec![
            entry("dog", "perro", ProficiencyLevel::Beginner, 50),
            entry("cat", "gato", ProficiencyLevel::Beginner, 20),
            entry("bird", "pájaro", ProficiencyLevel::Beginner, 80),
            entry("fish", "pez", ProficiencyLevel::Beginner, 10),
        ]);
        let selector = WordSelector::new(ProficiencyLevel::Beginner, 0.5).unwrap();
        let selection = selector.select(&tokenize("dog cat bird fish"), &lookup);

        assert_eq!(selection.eligible_words, 4);
        assert_eq!(selection.replaced_words(), 2);
        assert!(selection.entry_for("fish").is_some());
        assert!(selection.entry_for("cat").is_some());
    }

    #[test]
    fn test_equal_rank_prefers_first_occurrence() {
        let lookup = table(vec![
            entry("red", "rojo", ProficiencyLevel::Beginner, 5),
            entry("blue", "azul", ProficiencyLevel::Beginner, 5),
        ]);
        let selector = WordSelector::new(ProficiencyLevel::Beginner, 0.5).unwrap();
        let selection = selector.select(&tokenize("blue and red"), &lookup);
        assert!(selection.entry_for("blue").is_some());
        assert!(selection.entry_for("red").is_none());
    }

    #[test]
    fn test_duplicates_count_once() {
        let lookup = table(vec![
            entry("house", "casa", ProficiencyLevel::Beginner, 10),
            entry("dog", "perro", ProficiencyLevel::Beginner, 50),
        ]);
        let selector = WordSelector::new(ProficiencyLevel::Beginner, 0.5).unwrap();
        let selection = selector.select(&tokenize("House house HOUSE dog"), &lookup);

        assert_eq!(selection.total_words, 4);
        assert_eq!(selection.eligible_words, 2);
        assert_eq!(selection.replaced_words(), 1);
        assert_eq!(selection.entry_for("house").map(|e| e.target_word.as_str()), Some("casa"));
    }

    #[test]
    fn test_variant_matches_entry() {
        let mut e = entry("house", "casa", ProficiencyLevel::Beginner, 10);
        e.variants = vec!["houses".to_string()];
        let mut lookup = LookupTable::new();
        lookup.insert("houses".to_string(), Some(e));

        let selector = WordSelector::new(ProficiencyLevel::Beginner, 1.0).unwrap();
        let selection = selector.select(&tokenize("two houses"), &lookup);
        assert!(selection.entry_for("houses").is_some());
    }

    #[test]
    fn test_entry_not_matching_word_is_rejected() {
        let mut lookup = LookupTable::new();
        lookup.insert(
            "home".to_string(),
            Some(entry("house", "casa", ProficiencyLevel::Beginner, 10)),
        );
        let selector = WordSelector::new(ProficiencyLevel::Beginner, 1.0).unwrap();
        assert_eq!(selector.select(&tokenize("home"), &lookup).eligible_words, 0);
    }

    #[test]
    fn test_replaced_never_exceeds_budget() {
        let lookup = table(
            (0..20)
                .map(|i| {
                    let word: String = std::iter::repeat('a').take(i + 1).collect();
                    entry(&word, "x", ProficiencyLevel::Beginner, i as u32)
                })
                .collect(),
        );
        let content: Vec<String> = (0..20).map(|i| "a".repeat(i + 1)).collect();
        let content = content.join(" ");
        let segments = tokenize(&content);

        for step in 0..=10 {
            let density = step as f64 / 10.0;
            let selector = WordSelector::new(ProficiencyLevel::Beginner, density).unwrap();
            let selection = selector.select(&segments, &lookup);
            let bound = (density * selection.eligible_words as f64 - BUDGET_EPSILON).ceil() as usize;
            assert!(selection.replaced_words() <= bound);
            assert_eq!(selection.replaced_words(), selector.budget(selection.eligible_words));
        }
    }
}
