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

//! HTTP handler functions with OpenAPI documentation.
//!
//! Update requests address a section (`/config/{section}`) or a named
//! instance of a section (`/config/{section}/{name}`); the body is an
//! [`UpdateAction`] of the shape `{"set": {...}, "delete": [...]}`.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use log::info;
use std::sync::Arc;

use super::error::ErrorResponse;
use super::responses::HealthResponse;
use crate::config::ServerConfig;
use crate::service::{ConfigService, UpdateAction};
use crate::store::Override;

/// The concrete service type served by this API.
pub type Service = Arc<ConfigService<ServerConfig>>;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Check server health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// List all persisted override maps
#[utoipa::path(
    get,
    path = "/api/v1/config",
    responses(
        (status = 200, description = "All override records in id order", body = [Override]),
    ),
    tag = "Config"
)]
pub async fn list_overrides(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Override>>, ApiError> {
    let records = service
        .list()
        .await
        .map_err(|e| ErrorResponse::from(e).with_status())?;
    Ok(Json(records))
}

/// Get the persisted override map for a section
#[utoipa::path(
    get,
    path = "/api/v1/config/{section}",
    params(("section" = String, Path, description = "Section identity")),
    responses(
        (status = 200, description = "Override record", body = Override),
        (status = 404, description = "No override exists", body = ErrorResponse),
    ),
    tag = "Config"
)]
pub async fn get_override(
    Extension(service): Extension<Service>,
    Path(section): Path<String>,
) -> Result<Json<Override>, ApiError> {
    let record = service
        .current(&section, "")
        .await
        .map_err(|e| ErrorResponse::from(e).with_status())?;
    Ok(Json(record))
}

/// Get the persisted override map for a named section instance
#[utoipa::path(
    get,
    path = "/api/v1/config/{section}/{name}",
    params(
        ("section" = String, Path, description = "Section identity"),
        ("name" = String, Path, description = "Instance name"),
    ),
    responses(
        (status = 200, description = "Override record", body = Override),
        (status = 404, description = "No override exists", body = ErrorResponse),
    ),
    tag = "Config"
)]
pub async fn get_named_override(
    Extension(service): Extension<Service>,
    Path((section, name)): Path<(String, String)>,
) -> Result<Json<Override>, ApiError> {
    let record = service
        .current(&section, &name)
        .await
        .map_err(|e| ErrorResponse::from(e).with_status())?;
    Ok(Json(record))
}

/// Update a section
///
/// Merges the action into the section's persisted override map and applies
/// the merged map to the retained configuration. Nothing is persisted when
/// the application fails.
#[utoipa::path(
    put,
    path = "/api/v1/config/{section}",
    params(("section" = String, Path, description = "Section identity")),
    request_body = UpdateAction,
    responses(
        (status = 204, description = "Update applied"),
        (status = 400, description = "Invalid update", body = ErrorResponse),
    ),
    tag = "Config"
)]
pub async fn update_section(
    Extension(service): Extension<Service>,
    Extension(log_requests): Extension<Arc<bool>>,
    Path(section): Path<String>,
    Json(action): Json<UpdateAction>,
) -> Result<StatusCode, ApiError> {
    handle_update(&service, &section, "", action, *log_requests).await
}

/// Update a named instance of a section
#[utoipa::path(
    put,
    path = "/api/v1/config/{section}/{name}",
    params(
        ("section" = String, Path, description = "Section identity"),
        ("name" = String, Path, description = "Instance name"),
    ),
    request_body = UpdateAction,
    responses(
        (status = 204, description = "Update applied"),
        (status = 400, description = "Invalid update", body = ErrorResponse),
    ),
    tag = "Config"
)]
pub async fn update_named_section(
    Extension(service): Extension<Service>,
    Extension(log_requests): Extension<Arc<bool>>,
    Path((section, name)): Path<(String, String)>,
    Json(action): Json<UpdateAction>,
) -> Result<StatusCode, ApiError> {
    handle_update(&service, &section, &name, action, *log_requests).await
}

async fn handle_update(
    service: &Service,
    section: &str,
    name: &str,
    action: UpdateAction,
    log_requests: bool,
) -> Result<StatusCode, ApiError> {
    if log_requests {
        info!(
            "config update: section={section} name={name} set={} delete={}",
            action.set.len(),
            action.delete.len()
        );
    }
    service
        .update(section, name, action)
        .await
        .map_err(|e| ErrorResponse::from(e).with_status())?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove the persisted override map for a section
///
/// Removing a record does not republish the section; it only forgets the
/// stored overrides so future updates start from a clean map.
#[utoipa::path(
    delete,
    path = "/api/v1/config/{section}",
    params(("section" = String, Path, description = "Section identity")),
    responses(
        (status = 204, description = "Override removed (or absent)"),
    ),
    tag = "Config"
)]
pub async fn delete_override(
    Extension(service): Extension<Service>,
    Path(section): Path<String>,
) -> Result<StatusCode, ApiError> {
    service
        .remove(&section, "")
        .await
        .map_err(|e| ErrorResponse::from(e).with_status())?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove the persisted override map for a named section instance
#[utoipa::path(
    delete,
    path = "/api/v1/config/{section}/{name}",
    params(
        ("section" = String, Path, description = "Section identity"),
        ("name" = String, Path, description = "Instance name"),
    ),
    responses(
        (status = 204, description = "Override removed (or absent)"),
    ),
    tag = "Config"
)]
pub async fn delete_named_override(
    Extension(service): Extension<Service>,
    Path((section, name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    service
        .remove(&section, &name)
        .await
        .map_err(|e| ErrorResponse::from(e).with_status())?;
    Ok(StatusCode::NO_CONTENT)
}
