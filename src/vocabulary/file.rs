//! JSON file backed vocabulary
//!
//! The whole collection lives in memory and is written back to disk as a
//! pretty-printed JSON array after every change. Writes go to a sibling
//! temporary file first and are then renamed over the target, so a crash
//! mid-write leaves the previous snapshot intact.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::models::VocabularyItem;
use crate::vocabulary::repository::{VocabularyRepository, sort_oldest_first};

#[derive(Debug)]
pub struct JsonFileVocabulary {
    path: PathBuf,
    items: Mutex<HashMap<String, VocabularyItem>>,
}

impl JsonFileVocabulary {
    /// Open the snapshot at `path`; a missing file means an empty vocabulary
    ///
    /// Records with an ease factor below the floor or an out-of-range interval
    /// fail the whole load with [`StorageError::Serialization`].
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let items: Vec<VocabularyItem> = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StorageError::Serialization(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StorageError::Io(format!("{}: {}", path.display(), e))),
        };
        if let Some((item, problem)) =
            items.iter().find_map(|item| item.validation_problem().map(|problem| (item, problem)))
        {
            return Err(StorageError::Serialization(format!(
                "{}: item {}: {}",
                path.display(),
                item.id,
                problem
            )));
        }

        debug!(path = %path.display(), items = items.len(), "Opened vocabulary file");
        Ok(Self {
            path,
            items: Mutex::new(items.into_iter().map(|item| (item.id.clone(), item)).collect()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, items: &HashMap<String, VocabularyItem>) -> StorageResult<()> {
        let mut snapshot: Vec<VocabularyItem> = items.values().cloned().collect();
        sort_oldest_first(&mut snapshot);
        let json = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl VocabularyRepository for JsonFileVocabulary {
    async fn add(&self, item: VocabularyItem) -> StorageResult<()> {
        let mut items = self.items.lock().await;
        if items.contains_key(&item.id) {
            return Err(StorageError::Duplicate(item.id));
        }
        let id = item.id.clone();
        items.insert(id.clone(), item);
        if let Err(e) = self.persist(&items).await {
            items.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    async fn update(&self, item: &VocabularyItem) -> StorageResult<()> {
        let mut items = self.items.lock().await;
        let Some(stored) = items.get_mut(&item.id) else {
            return Err(StorageError::NotFound(item.id.clone()));
        };
        let previous = std::mem::replace(stored, item.clone());
        if let Err(e) = self.persist(&items).await {
            items.insert(previous.id.clone(), previous);
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let mut items = self.items.lock().await;
        let removed = items.remove(id).ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        if let Err(e) = self.persist(&items).await {
            items.insert(removed.id.clone(), removed);
            return Err(e);
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> StorageResult<Option<VocabularyItem>> {
        Ok(self.items.lock().await.get(id).cloned())
    }

    async fn get_all(&self) -> StorageResult<Vec<VocabularyItem>> {
        let mut all: Vec<VocabularyItem> = self.items.lock().await.values().cloned().collect();
        sort_oldest_first(&mut all);
        Ok(all)
    }
}
