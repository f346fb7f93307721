// Copyright 2025 The Overlay Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Persistence of override maps.
//!
//! The store records, per section target, the accumulated override map that
//! callers have applied so far. It knows nothing about the override engine;
//! records are plain data keyed by target id.

use async_trait::async_trait;
use indexmap::IndexMap;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::overlay::OverrideSet;

/// A persisted override map for one section target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Override {
    /// Unique identifier of the target (`section` or `section/name`).
    pub id: String,
    /// Key/value pairs to apply to the target section.
    #[schema(value_type = Object)]
    pub overrides: OverrideSet,
}

/// Errors raised by an override store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no override exists")]
    NotFound,

    #[error("failed to access override store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode override store: {0}")]
    Encode(#[from] serde_yaml::Error),
}

/// Data access object for [`Override`] records.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// Retrieve an override by id.
    async fn get(&self, id: &str) -> Result<Override, StoreError>;

    /// Set an override. Created if absent, replaced otherwise.
    async fn set(&self, record: Override) -> Result<(), StoreError>;

    /// Delete an override. Deleting a non-existent override is not an error.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// List all overrides in id order.
    async fn list(&self) -> Result<Vec<Override>, StoreError>;
}

fn sorted(records: &IndexMap<String, Override>) -> Vec<Override> {
    let mut list: Vec<Override> = records.values().cloned().collect();
    list.sort_by(|a, b| a.id.cmp(&b.id));
    list
}

/// In-memory override store; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryOverrideStore {
    records: RwLock<IndexMap<String, Override>>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OverrideStore for MemoryOverrideStore {
    async fn get(&self, id: &str) -> Result<Override, StoreError> {
        let records = self.records.read().await;
        records.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn set(&self, record: Override) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.shift_remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Override>, StoreError> {
        let records = self.records.read().await;
        Ok(sorted(&records))
    }
}

/// File-backed override store.
///
/// All records live in one YAML document. Writes go through a temp file and
/// an atomic rename so a crash mid-write cannot corrupt existing data.
pub struct FileOverrideStore {
    path: PathBuf,
    records: RwLock<IndexMap<String, Override>>,
}

impl FileOverrideStore {
    /// Open a store at `path`, loading any existing records.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let loaded: Vec<Override> = serde_yaml::from_str(&content)?;
            debug!(
                "loaded {} override record(s) from {}",
                loaded.len(),
                path.display()
            );
            loaded.into_iter().map(|r| (r.id.clone(), r)).collect()
        } else {
            IndexMap::new()
        };
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Write the full record set to disk atomically.
    async fn save(&self) -> Result<(), StoreError> {
        let records = self.records.read().await;
        let content = serde_yaml::to_string(&sorted(&records))?;
        drop(records);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, content)?;
        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            error!(
                "failed to rename {} to {}: {e}",
                temp_path.display(),
                self.path.display()
            );
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl OverrideStore for FileOverrideStore {
    async fn get(&self, id: &str) -> Result<Override, StoreError> {
        let records = self.records.read().await;
        records.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn set(&self, record: Override) -> Result<(), StoreError> {
        {
            let mut records = self.records.write().await;
            records.insert(record.id.clone(), record);
        }
        self.save().await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let removed = {
            let mut records = self.records.write().await;
            records.shift_remove(id).is_some()
        };
        if removed {
            self.save().await?;
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Override>, StoreError> {
        let records = self.records.read().await;
        Ok(sorted(&records))
    }
}
