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

//! Config-change alerting.
//!
//! Drains the update channel and publishes one message per configuration
//! change to the configured topic. The publisher is a trait so deployments
//! can plug in a real message broker client; the built-in implementation
//! writes to the log.

use async_trait::async_trait;
use log::{error, info};
use tokio::sync::mpsc;

use crate::config::AlertSettings;
use crate::service::ConfigUpdate;

/// Publishes alert messages to a topic.
#[async_trait]
pub trait AlertPublisher: Send + Sync {
    async fn publish(&self, topic: &str, message: &str) -> anyhow::Result<()>;
}

/// Publisher that writes messages to the process log.
#[derive(Default)]
pub struct LogAlertPublisher;

#[async_trait]
impl AlertPublisher for LogAlertPublisher {
    async fn publish(&self, topic: &str, message: &str) -> anyhow::Result<()> {
        info!("[{topic}] {message}");
        Ok(())
    }
}

/// Task that turns config updates into alert messages.
pub struct ConfigChangeAlerter {
    settings: Option<AlertSettings>,
    publisher: Box<dyn AlertPublisher>,
}

impl ConfigChangeAlerter {
    /// Create an alerter. A `None` settings slot disables publishing while
    /// still draining the channel.
    pub fn new(settings: Option<AlertSettings>, publisher: Box<dyn AlertPublisher>) -> Self {
        Self {
            settings,
            publisher,
        }
    }

    /// Drain `updates` until the channel closes.
    pub async fn run(self, mut updates: mpsc::UnboundedReceiver<ConfigUpdate>) {
        while let Some(update) = updates.recv().await {
            self.handle(&update).await;
        }
    }

    async fn handle(&self, update: &ConfigUpdate) {
        let Some(settings) = &self.settings else {
            return;
        };
        if !settings.enabled {
            return;
        }
        let message = format!("configuration section {} updated", update.name);
        if let Err(e) = self.publisher.publish(&settings.topic, &message).await {
            error!("failed to publish config-change alert: {e}");
        }
    }
}
