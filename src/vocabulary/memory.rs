use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::models::VocabularyItem;
use crate::vocabulary::repository::{VocabularyRepository, sort_oldest_first};

/// Vocabulary kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryVocabulary {
    items: RwLock<HashMap<String, VocabularyItem>>,
}

impl InMemoryVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection; later duplicates of an id win
    pub fn with_items(items: impl IntoIterator<Item = VocabularyItem>) -> Self {
        Self {
            items: RwLock::new(items.into_iter().map(|item| (item.id.clone(), item)).collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl VocabularyRepository for InMemoryVocabulary {
    async fn add(&self, item: VocabularyItem) -> StorageResult<()> {
        let mut items = self.items.write().await;
        if items.contains_key(&item.id) {
            return Err(StorageError::Duplicate(item.id));
        }
        items.insert(item.id.clone(), item);
        Ok(())
    }

    async fn update(&self, item: &VocabularyItem) -> StorageResult<()> {
        let mut items = self.items.write().await;
        match items.get_mut(&item.id) {
            Some(stored) => {
                *stored = item.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound(item.id.clone())),
        }
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        self.items
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn get(&self, id: &str) -> StorageResult<Option<VocabularyItem>> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn get_all(&self) -> StorageResult<Vec<VocabularyItem>> {
        let mut all: Vec<VocabularyItem> = self.items.read().await.values().cloned().collect();
        sort_oldest_first(&mut all);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::models::{LanguagePair, VocabularyStatus};

    fn word(source: &str, days_ago: i64) -> VocabularyItem {
        let pair = LanguagePair::new("en", "es").unwrap();
        VocabularyItem::new(source, "x", &pair, Utc::now() - Duration::days(days_ago))
    }

    #[tokio::test]
    async fn test_add_get_update_delete() {
        let store = InMemoryVocabulary::new();
        let mut item = word("house", 0);
        store.add(item.clone()).await.unwrap();
        assert_eq!(store.get(&item.id).await.unwrap(), Some(item.clone()));

        item.status = VocabularyStatus::Learning;
        store.update(&item).await.unwrap();
        assert_eq!(store.get(&item.id).await.unwrap().unwrap().status, VocabularyStatus::Learning);

        store.delete(&item.id).await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(store.delete(&item.id).await, Err(StorageError::NotFound(item.id.clone())));
    }

    #[tokio::test]
    async fn test_duplicate_and_missing_ids() {
        let store = InMemoryVocabulary::new();
        let item = word("house", 0);
        store.add(item.clone()).await.unwrap();
        assert!(matches!(store.add(item).await, Err(StorageError::Duplicate(_))));

        let ghost = word("ghost", 0);
        assert!(matches!(store.update(&ghost).await, Err(StorageError::NotFound(_))));
        assert_eq!(store.get(&ghost.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_all_is_oldest_first() {
        let newer = word("newer", 1);
        let older = word("older", 5);
        let store = InMemoryVocabulary::with_items(vec![newer.clone(), older.clone()]);

        let all = store.get_all().await.unwrap();
        assert_eq!(all, vec![older, newer]);
    }

    #[tokio::test]
    async fn test_due_on_empty_store_is_empty() {
        let store = InMemoryVocabulary::new();
        assert!(store.get_due_for_review(10, Utc::now()).await.unwrap().is_empty());
    }
}
