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

//! Server assembly.
//!
//! Wires the override store, the update service, the alerter task, and the
//! HTTP API together from a [`ServerConfig`].

use anyhow::Result;
use axum::{routing::get, Router};
use log::info;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::alerts::{ConfigChangeAlerter, LogAlertPublisher};
use crate::api;
use crate::config::ServerConfig;
use crate::overlay::toml_field_name;
use crate::service::ConfigService;
use crate::store::{FileOverrideStore, MemoryOverrideStore, OverrideStore};

/// A fully wired overlay server, ready to run.
pub struct OverlayServer {
    config: ServerConfig,
    service: Arc<ConfigService<ServerConfig>>,
    alerter: ConfigChangeAlerter,
    updates_rx: mpsc::UnboundedReceiver<crate::service::ConfigUpdate>,
}

impl OverlayServer {
    /// Assemble a server from its configuration.
    ///
    /// With `storage.persist` enabled the override store is file-backed at
    /// `storage.path`; otherwise overrides live in memory only.
    pub fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn OverrideStore> = if config.storage.persist {
            info!("persisting overrides to {}", config.storage.path);
            Arc::new(FileOverrideStore::open(&config.storage.path)?)
        } else {
            info!("override persistence disabled; overrides are in-memory only");
            Arc::new(MemoryOverrideStore::new())
        };

        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        // Override keys address options by their TOML names, matching the
        // dashed spelling used in configuration files.
        let service = Arc::new(ConfigService::new(
            config.clone(),
            toml_field_name,
            store,
            updates_tx,
        ));
        let alerter = ConfigChangeAlerter::new(
            config.alerts.clone(),
            Box::new(LogAlertPublisher),
        );

        Ok(Self {
            config,
            service,
            alerter,
            updates_rx,
        })
    }

    /// The update service backing the HTTP API.
    pub fn service(&self) -> Arc<ConfigService<ServerConfig>> {
        self.service.clone()
    }

    /// Build the application router (also used by API tests).
    pub fn router(&self) -> Router {
        let openapi_v1 = api::ApiDocV1::openapi();
        let v1_router = api::build_v1_router(
            self.service.clone(),
            Arc::new(self.config.http.log_requests),
        );

        Router::new()
            .route("/health", get(api::health_check))
            .nest("/api/v1", v1_router)
            .merge(SwaggerUi::new("/api/v1/docs").url("/api/v1/openapi.json", openapi_v1))
            .layer(CorsLayer::permissive())
    }

    /// Run until interrupted.
    pub async fn run(self) -> Result<()> {
        let app = self.router();

        // Alerter drains the update channel for the lifetime of the server.
        let alerter = self.alerter;
        let updates_rx = self.updates_rx;
        tokio::spawn(alerter.run(updates_rx));

        let addr = format!("{}:{}", self.config.http.bind_address, self.config.http.port);
        info!("starting web API on {addr}");
        info!("Swagger UI available at http://{addr}/api/v1/docs/");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
    }
}
