//! Vocabulary persistence trait
//!
//! The review scheduler only needs a narrow, typed view of storage. Anything
//! that can add, update, delete and list [`VocabularyItem`]s can back a
//! [`VocabularyService`](crate::vocabulary::VocabularyService), including a
//! plain in-memory collection in tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageResult;
use crate::models::VocabularyItem;
use crate::vocabulary::scheduler::due_queue;

#[async_trait]
pub trait VocabularyRepository: Send + Sync {
    /// Store a new item; fails with `StorageError::Duplicate` if the id is taken
    async fn add(&self, item: VocabularyItem) -> StorageResult<()>;

    /// Replace a stored item; fails with `StorageError::NotFound` if it is absent
    async fn update(&self, item: &VocabularyItem) -> StorageResult<()>;

    /// Remove an item; fails with `StorageError::NotFound` if it is absent
    async fn delete(&self, id: &str) -> StorageResult<()>;

    async fn get(&self, id: &str) -> StorageResult<Option<VocabularyItem>>;

    /// Every stored item, oldest first
    async fn get_all(&self) -> StorageResult<Vec<VocabularyItem>>;

    /// Up to `limit` items due at `now`, in review-queue order
    ///
    /// An empty store yields an empty list. Stores with an index over due dates
    /// can override this; the default filters [`get_all`](Self::get_all).
    async fn get_due_for_review(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> StorageResult<Vec<VocabularyItem>> {
        let items = self.get_all().await?;
        Ok(due_queue(&items, limit, now))
    }
}

#[async_trait]
impl<R: VocabularyRepository + ?Sized> VocabularyRepository for Arc<R> {
    async fn add(&self, item: VocabularyItem) -> StorageResult<()> {
        (**self).add(item).await
    }

    async fn update(&self, item: &VocabularyItem) -> StorageResult<()> {
        (**self).update(item).await
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        (**self).delete(id).await
    }

    async fn get(&self, id: &str) -> StorageResult<Option<VocabularyItem>> {
        (**self).get(id).await
    }

    async fn get_all(&self) -> StorageResult<Vec<VocabularyItem>> {
        (**self).get_all().await
    }

    async fn get_due_for_review(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> StorageResult<Vec<VocabularyItem>> {
        (**self).get_due_for_review(limit, now).await
    }
}

/// Sort items the way `get_all` promises: by `added_at`, then id
pub(crate) fn sort_oldest_first(items: &mut [VocabularyItem]) {
    items.sort_by(|a, b| a.added_at.cmp(&b.added_at).then_with(|| a.id.cmp(&b.id)));
}
