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

//! Server configuration types.
//!
//! The server's own configuration is also the configuration it manages:
//! every top-level section registered in [`ServerConfig::schema`] can be
//! overridden at runtime through the HTTP API.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::overlay::{
    ConfigSchema, FieldDescriptor, FieldKind, Overridable, SectionSchema,
};

/// Top-level configuration for overlay-server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default = "default_alerts")]
    pub alerts: Option<AlertSettings>,
    #[serde(default)]
    pub logging: LogSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            storage: StorageSettings::default(),
            alerts: default_alerts(),
            logging: LogSettings::default(),
        }
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whether to log one line per handled update request.
    #[serde(default = "default_log_requests")]
    pub log_requests: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            log_requests: default_log_requests(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7090
}

fn default_log_requests() -> bool {
    true
}

/// Override store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_store_path")]
    pub path: String,
    /// When false, overrides live in memory only and are lost on restart.
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            persist: default_persist(),
        }
    }
}

fn default_store_path() -> String {
    "data/overrides.yaml".to_string()
}

fn default_persist() -> bool {
    true
}

/// Settings for the config-change alerter.
///
/// Stored behind an optional slot: a configuration without an `alerts`
/// section disables alerting entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_broker_url")]
    pub broker_url: String,
    #[serde(default = "default_topic")]
    pub topic: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            broker_url: default_broker_url(),
            topic: default_topic(),
        }
    }
}

fn default_alerts() -> Option<AlertSettings> {
    Some(AlertSettings::default())
}

fn default_broker_url() -> String {
    "localhost:9092".to_string()
}

fn default_topic() -> String {
    "config-updates".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Overridable for ServerConfig {
    fn schema() -> ConfigSchema {
        ConfigSchema::new()
            .with_section(
                SectionSchema::new("http", "http")
                    .with_field(
                        FieldDescriptor::new("bind_address", FieldKind::String)
                            .with_tag("toml", "bind-address")
                            .with_tag("json", "bindAddress"),
                    )
                    .with_field(
                        FieldDescriptor::new("port", FieldKind::U16)
                            .with_tag("toml", "port")
                            .with_tag("json", "port"),
                    )
                    .with_field(
                        FieldDescriptor::new("log_requests", FieldKind::Bool)
                            .with_tag("toml", "log-requests")
                            .with_tag("json", "logRequests"),
                    ),
            )
            .with_section(
                SectionSchema::new("storage", "storage")
                    .with_field(
                        FieldDescriptor::new("path", FieldKind::String)
                            .with_tag("toml", "path")
                            .with_tag("json", "path"),
                    )
                    .with_field(
                        FieldDescriptor::new("persist", FieldKind::Bool)
                            .with_tag("toml", "persist")
                            .with_tag("json", "persist"),
                    ),
            )
            .with_section(
                SectionSchema::new("alerts", "alerts")
                    .with_field(
                        FieldDescriptor::new("enabled", FieldKind::Bool)
                            .with_tag("toml", "enabled")
                            .with_tag("json", "enabled"),
                    )
                    .with_field(
                        FieldDescriptor::new("broker_url", FieldKind::String)
                            .with_tag("toml", "broker-url")
                            .with_tag("json", "brokerUrl"),
                    )
                    .with_field(
                        FieldDescriptor::new("topic", FieldKind::String)
                            .with_tag("toml", "topic")
                            .with_tag("json", "topic"),
                    ),
            )
            .with_section(
                SectionSchema::new("logging", "logging").with_field(
                    FieldDescriptor::new("level", FieldKind::String)
                        .with_tag("toml", "level")
                        .with_tag("json", "level"),
                ),
            )
    }
}

impl ServerConfig {
    /// Validate operational settings before the server starts.
    pub fn validate(&self) -> Result<()> {
        if self.http.port == 0 {
            return Err(anyhow::anyhow!(
                "Invalid HTTP port: {} (cannot be 0)",
                self.http.port
            ));
        }
        if self.http.bind_address.is_empty() {
            return Err(anyhow::anyhow!("HTTP bind address cannot be empty"));
        }
        if self.storage.persist && self.storage.path.is_empty() {
            return Err(anyhow::anyhow!(
                "Storage path cannot be empty when persistence is enabled"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::toml_field_name;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.http.port, 7090);
        assert!(config.alerts.is_some());
    }

    #[test]
    fn test_zero_port_is_rejected() {
        let mut config = ServerConfig::default();
        config.http.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_store_path_requires_persist_off() {
        let mut config = ServerConfig::default();
        config.storage.path = String::new();
        assert!(config.validate().is_err());

        config.storage.persist = false;
        config.validate().unwrap();
    }

    #[test]
    fn test_schema_covers_every_section() {
        let schema = ServerConfig::schema();
        for section in ["http", "storage", "alerts", "logging"] {
            assert!(
                schema.sections().iter().any(|s| s.section_tag() == section),
                "missing section {section}"
            );
        }
    }

    #[test]
    fn test_schema_field_names_match_serialized_names() {
        let schema = ServerConfig::schema();
        let tree = serde_json::to_value(ServerConfig::default()).unwrap();
        for section in schema.sections() {
            let slot = &tree[section.field_name()];
            assert!(
                !slot.is_null() || section.field_name() == "alerts",
                "section field {} missing from serialized config",
                section.field_name()
            );
            if let Some(options) = slot.as_object() {
                for field in section.fields() {
                    assert!(
                        options.contains_key(field.name()),
                        "option {} missing from serialized section {}",
                        field.name(),
                        section.field_name()
                    );
                }
            }
        }
    }

    #[test]
    fn test_toml_names_use_dashed_forms() {
        let schema = ServerConfig::schema();
        let http = schema.section_by_field("http").unwrap();
        let field = http.field("bind_address").unwrap();
        assert_eq!(toml_field_name(field), "bind-address");
    }
}
