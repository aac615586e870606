//! Grading entry point over a vocabulary repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::{ReviewResult, StorageError, StorageResult};
use crate::models::{ForeignWordRecord, LanguagePair, VocabularyItem, VocabularyStatus, normalize_word};
use crate::vocabulary::repository::VocabularyRepository;
use crate::vocabulary::scheduler::{Quality, grade_review, is_due};

/// Counts per status plus how many items are due right now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VocabularyStats {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub learned: usize,
    pub due: usize,
}

/// Saves words and applies reviews through an injected repository
#[derive(Debug)]
pub struct VocabularyService<R> {
    repository: R,
}

impl<R: VocabularyRepository> VocabularyService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Save a substitution the learner picked while reading
    ///
    /// Saving a word that is already in the vocabulary for the same language
    /// pair returns the stored item instead of creating a second one.
    pub async fn save_word(
        &self,
        record: &ForeignWordRecord,
        context_sentence: Option<String>,
        book_id: Option<String>,
    ) -> StorageResult<VocabularyItem> {
        let languages = record.word_entry.language_pair();
        if let Some(existing) = self.find_saved(&record.word_entry.source_word, &languages).await? {
            return Ok(existing);
        }
        let item = VocabularyItem::from_record(record, context_sentence, book_id, Utc::now());
        self.insert(item).await
    }

    /// Save a word pair that did not come from a processed text
    pub async fn save_pair(
        &self,
        source_word: &str,
        target_word: &str,
        languages: &LanguagePair,
        context_sentence: Option<String>,
    ) -> StorageResult<VocabularyItem> {
        if let Some(existing) = self.find_saved(source_word, languages).await? {
            return Ok(existing);
        }
        let mut item = VocabularyItem::new(source_word, target_word, languages, Utc::now());
        item.context_sentence = context_sentence;
        self.insert(item).await
    }

    /// Stored item for `source_word` in `languages`, compared case-insensitively
    pub async fn find_saved(
        &self,
        source_word: &str,
        languages: &LanguagePair,
    ) -> StorageResult<Option<VocabularyItem>> {
        let wanted = normalize_word(source_word);
        Ok(self.repository.get_all().await?.into_iter().find(|item| {
            normalize_word(&item.source_word) == wanted
                && item.source_language.eq_ignore_ascii_case(&languages.source)
                && item.target_language.eq_ignore_ascii_case(&languages.target)
        }))
    }

    async fn insert(&self, item: VocabularyItem) -> StorageResult<VocabularyItem> {
        self.repository.add(item.clone()).await?;
        info!(id = %item.id, word = %item.source_word, "Saved vocabulary item");
        Ok(item)
    }

    /// Grade the item `id` now
    pub async fn record_review(&self, id: &str, quality: i64) -> ReviewResult<VocabularyItem> {
        self.record_review_at(id, quality, Utc::now()).await
    }

    /// Grade the item `id` as of `now`
    ///
    /// The quality is validated before anything is loaded, so a bad grade
    /// never touches storage.
    pub async fn record_review_at(
        &self,
        id: &str,
        quality: i64,
        now: DateTime<Utc>,
    ) -> ReviewResult<VocabularyItem> {
        let quality = Quality::try_from(quality)?;
        let mut item = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        grade_review(&mut item, quality, now);
        self.repository.update(&item).await?;
        Ok(item)
    }

    pub async fn due_for_review(&self, limit: usize) -> StorageResult<Vec<VocabularyItem>> {
        self.repository.get_due_for_review(limit, Utc::now()).await
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.repository.delete(id).await
    }

    pub async fn stats(&self) -> StorageResult<VocabularyStats> {
        self.stats_at(Utc::now()).await
    }

    pub async fn stats_at(&self, now: DateTime<Utc>) -> StorageResult<VocabularyStats> {
        let items = self.repository.get_all().await?;
        let mut stats = VocabularyStats { total: items.len(), ..Default::default() };
        for item in &items {
            match item.status {
                VocabularyStatus::New => stats.new += 1,
                VocabularyStatus::Learning => stats.learning += 1,
                VocabularyStatus::Review => stats.review += 1,
                VocabularyStatus::Learned => stats.learned += 1,
            }
            if is_due(item, now) {
                stats.due += 1;
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::error::ReviewError;
    use crate::models::{ProficiencyLevel, WordEntry};
    use crate::vocabulary::InMemoryVocabulary;

    fn record(source: &str, target: &str) -> ForeignWordRecord {
        ForeignWordRecord {
            original_word: source.to_string(),
            foreign_word: target.to_string(),
            start_index: 4,
            end_index: 4 + source.len(),
            word_entry: WordEntry {
                id: format!("en-es-{}", source),
                source_word: source.to_string(),
                target_word: target.to_string(),
                source_language: "en".to_string(),
                target_language: "es".to_string(),
                proficiency_level: ProficiencyLevel::Beginner,
                frequency_rank: 10,
                part_of_speech: "noun".to_string(),
                variants: Vec::new(),
                pronunciation: None,
            },
        }
    }

    fn service() -> VocabularyService<InMemoryVocabulary> {
        VocabularyService::new(InMemoryVocabulary::new())
    }

    #[tokio::test]
    async fn test_save_word_creates_new_item() {
        let service = service();
        let item = service
            .save_word(&record("house", "casa"), Some("The house is big.".to_string()), Some("book-1".to_string()))
            .await
            .unwrap();

        assert_eq!(item.status, VocabularyStatus::New);
        assert_eq!(item.interval, 0);
        assert_eq!(item.review_count, 0);
        assert!((item.ease_factor - 2.5).abs() < 1e-9);
        assert_eq!(item.book_id.as_deref(), Some("book-1"));
        assert_eq!(service.repository().get(&item.id).await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn test_saving_twice_returns_existing_item() {
        let service = service();
        let first = service.save_word(&record("house", "casa"), None, None).await.unwrap();
        let second = service.save_word(&record("House", "casa"), None, None).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(service.stats().await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_record_review_updates_storage() {
        let service = service();
        let item = service.save_word(&record("house", "casa"), None, None).await.unwrap();

        let graded = service.record_review(&item.id, 4).await.unwrap();
        assert_eq!(graded.interval, 1);
        assert_eq!(graded.status, VocabularyStatus::Learning);
        assert_eq!(service.repository().get(&item.id).await.unwrap(), Some(graded));
    }

    #[tokio::test]
    async fn test_invalid_quality_is_rejected_without_changes() {
        let service = service();
        let item = service.save_word(&record("house", "casa"), None, None).await.unwrap();

        assert_eq!(service.record_review(&item.id, 6).await, Err(ReviewError::InvalidQuality(6)));
        assert_eq!(service.record_review(&item.id, -1).await, Err(ReviewError::InvalidQuality(-1)));
        assert_eq!(service.record_review(&item.id, 300).await, Err(ReviewError::InvalidQuality(300)));
        let stored = service.repository().get(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.review_count, 0);
        assert_eq!(stored.last_reviewed_at, None);
    }

    #[tokio::test]
    async fn test_review_of_unknown_item() {
        assert_eq!(
            service().record_review("missing", 3).await,
            Err(ReviewError::Storage(StorageError::NotFound("missing".to_string())))
        );
    }

    #[tokio::test]
    async fn test_due_for_review_and_stats() {
        let service = service();
        let now = Utc::now();
        let house = service.save_word(&record("house", "casa"), None, None).await.unwrap();
        let dog = service.save_word(&record("dog", "perro"), None, None).await.unwrap();

        service.record_review_at(&dog.id, 5, now - Duration::days(3)).await.unwrap();
        service.record_review_at(&dog.id, 5, now - Duration::days(2)).await.unwrap();

        let stats = service.stats_at(now).await.unwrap();
        assert_eq!(stats, VocabularyStats { total: 2, new: 1, learning: 0, review: 1, learned: 0, due: 1 });

        let due = service.due_for_review(10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, house.id);

        service.delete(&house.id).await.unwrap();
        assert!(service.due_for_review(10).await.unwrap().is_empty());
    }
}
