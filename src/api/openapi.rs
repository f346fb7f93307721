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

//! OpenAPI documentation for API v1.

use utoipa::OpenApi;

use super::error::ErrorResponse;
use super::handlers;
use super::responses::HealthResponse;
use crate::service::UpdateAction;
use crate::store::Override;

/// OpenAPI document for the v1 API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::list_overrides,
        handlers::get_override,
        handlers::get_named_override,
        handlers::update_section,
        handlers::update_named_section,
        handlers::delete_override,
        handlers::delete_named_override,
    ),
    components(schemas(UpdateAction, Override, ErrorResponse, HealthResponse)),
    tags(
        (name = "Health", description = "Operational endpoints"),
        (name = "Config", description = "Configuration override management"),
    ),
    info(
        title = "Overlay Server API",
        description = "Runtime configuration overrides for a managed configuration object",
    )
)]
pub struct ApiDocV1;
