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

//! Integration tests for override persistence across service restarts.

use overlay_server::overlay::toml_field_name;
use overlay_server::{ConfigService, ConfigUpdate, FileOverrideStore, ServerConfig, UpdateAction};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn open_service(
    path: &Path,
) -> (
    ConfigService<ServerConfig>,
    mpsc::UnboundedReceiver<ConfigUpdate>,
) {
    let store = Arc::new(FileOverrideStore::open(path).unwrap());
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ConfigService::new(ServerConfig::default(), toml_field_name, store, tx),
        rx,
    )
}

fn set_action(pairs: &[(&str, Value)]) -> UpdateAction {
    UpdateAction {
        set: pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
        delete: Vec::new(),
    }
}

#[tokio::test]
async fn test_overrides_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.yaml");

    {
        let (service, _rx) = open_service(&path);
        service
            .update("http", "", set_action(&[("port", json!(9090))]))
            .await
            .unwrap();
        service
            .update("logging", "", set_action(&[("level", json!("debug"))]))
            .await
            .unwrap();
    }

    // A fresh service over the same file sees the persisted maps.
    let (service, _rx) = open_service(&path);
    let records = service.list().await.unwrap();
    assert_eq!(records.len(), 2);

    let http = service.current("http", "").await.unwrap();
    assert_eq!(http.overrides["port"], json!(9090));
}

#[tokio::test]
async fn test_restarted_service_merges_onto_persisted_map() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.yaml");

    {
        let (service, _rx) = open_service(&path);
        service
            .update("http", "", set_action(&[("port", json!(9090))]))
            .await
            .unwrap();
    }

    let (service, mut rx) = open_service(&path);
    let value = service
        .update("http", "", set_action(&[("bind-address", json!("::1"))]))
        .await
        .unwrap();

    // The persisted port override is still in effect after the restart.
    assert_eq!(value["port"], json!(9090));
    assert_eq!(value["bind_address"], json!("::1"));

    let update = rx.try_recv().unwrap();
    assert_eq!(update.name, "http");
    assert_eq!(update.new_config["port"], json!(9090));
}

#[tokio::test]
async fn test_numeric_values_survive_yaml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.yaml");

    {
        let (service, _rx) = open_service(&path);
        service
            .update(
                "http",
                "",
                set_action(&[("port", json!(9090)), ("log-requests", json!(false))]),
            )
            .await
            .unwrap();
    }

    let (service, _rx) = open_service(&path);
    let value = service
        .update("http", "", UpdateAction::default())
        .await
        .unwrap();
    assert_eq!(value["port"], json!(9090));
    assert_eq!(value["log_requests"], json!(false));
}
