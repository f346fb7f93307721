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

//! API v1 route definitions.
//!
//! All routes here are designed to be nested under `/api/v1/`.

use axum::{
    extract::Extension,
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;

use super::handlers::{self, Service};

/// Build the v1 API router.
pub fn build_v1_router(service: Service, log_requests: Arc<bool>) -> Router {
    Router::new()
        .route("/config", get(handlers::list_overrides))
        .route("/config/:section", put(handlers::update_section))
        .route("/config/:section", get(handlers::get_override))
        .route("/config/:section", delete(handlers::delete_override))
        .route("/config/:section/:name", put(handlers::update_named_section))
        .route("/config/:section/:name", get(handlers::get_named_override))
        .route(
            "/config/:section/:name",
            delete(handlers::delete_named_override),
        )
        .layer(Extension(service))
        .layer(Extension(log_requests))
}
