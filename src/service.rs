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

//! The configuration update service.
//!
//! Ties the override engine, the override store, and the downstream update
//! channel together. Each update request merges the incoming set/delete
//! action into the target's persisted override map, applies the merged map
//! through the engine, and on success persists the map and publishes the new
//! section value to consumers. A failed application leaves the store
//! untouched.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use utoipa::ToSchema;

use crate::overlay::{FieldNameFn, Overridable, OverrideEngine, OverrideError, OverrideSet};
use crate::store::{Override, OverrideStore, StoreError};

/// A configuration change dispatched to downstream consumers after a
/// successful update.
#[derive(Debug, Clone)]
pub struct ConfigUpdate {
    /// Section identity of the updated section.
    pub name: String,
    /// The freshly modified section value.
    pub new_config: Value,
}

/// JSON body of an update request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAction {
    /// Option values to set, keyed by external option name.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub set: OverrideSet,
    /// Previously set option names to remove from the override map.
    #[serde(default)]
    pub delete: Vec<String>,
}

/// Errors raised by the update service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to update config: {0}")]
    Override(#[from] OverrideError),

    #[error("override store error: {0}")]
    Store(#[from] StoreError),
}

/// Applies update actions to a retained configuration and fans results out
/// to the store and the update channel.
pub struct ConfigService<C> {
    engine: OverrideEngine<C>,
    store: Arc<dyn OverrideStore>,
    updates: mpsc::UnboundedSender<ConfigUpdate>,
}

impl<C> ConfigService<C>
where
    C: Overridable + Serialize,
{
    /// Create a service managing `config`.
    ///
    /// `field_name_fn` determines how override keys address option fields,
    /// e.g. [`toml_field_name`](crate::overlay::toml_field_name) for
    /// TOML-style dashed names.
    pub fn new(
        config: C,
        field_name_fn: FieldNameFn,
        store: Arc<dyn OverrideStore>,
        updates: mpsc::UnboundedSender<ConfigUpdate>,
    ) -> Self {
        Self {
            engine: OverrideEngine::new(config).with_field_name_fn(field_name_fn),
            store,
            updates,
        }
    }

    /// The engine's retained original configuration.
    pub fn original(&self) -> &C {
        self.engine.original()
    }

    /// Apply an update action to `section` (optionally a named instance).
    ///
    /// The action is merged into the persisted override map for the target:
    /// deletions first, then the new set. The merged map must apply cleanly
    /// to the retained configuration, otherwise nothing is persisted or
    /// published.
    pub async fn update(
        &self,
        section: &str,
        name: &str,
        action: UpdateAction,
    ) -> Result<Value, ServiceError> {
        let id = target_id(section, name);

        let mut overrides = match self.store.get(&id).await {
            Ok(record) => record.overrides,
            Err(StoreError::NotFound) => OverrideSet::new(),
            Err(e) => return Err(e.into()),
        };
        for key in &action.delete {
            overrides.shift_remove(key);
        }
        overrides.extend(action.set);

        let new_config = self.engine.apply(section, name, &overrides)?;

        self.store.set(Override { id, overrides }).await?;

        debug!("applied override update to section {section}");
        let update = ConfigUpdate {
            name: section.to_string(),
            new_config: new_config.clone(),
        };
        if self.updates.send(update).is_err() {
            warn!("no consumer for config updates; dropping notification for {section}");
        }

        Ok(new_config)
    }

    /// The persisted override map for a target.
    pub async fn current(&self, section: &str, name: &str) -> Result<Override, ServiceError> {
        Ok(self.store.get(&target_id(section, name)).await?)
    }

    /// Remove the persisted override map for a target. The retained
    /// configuration is unaffected; removal is not an update.
    pub async fn remove(&self, section: &str, name: &str) -> Result<(), ServiceError> {
        Ok(self.store.delete(&target_id(section, name)).await?)
    }

    /// All persisted override maps in id order.
    pub async fn list(&self) -> Result<Vec<Override>, ServiceError> {
        Ok(self.store.list().await?)
    }
}

/// Storage identity of a section target.
fn target_id(section: &str, name: &str) -> String {
    if name.is_empty() {
        section.to_string()
    } else {
        format!("{section}/{name}")
    }
}
