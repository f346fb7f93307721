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

//! REST API for managing configuration overrides.
//!
//! ```text
//! /health                            - Health check (unversioned)
//! /api/v1/config                     - List persisted override maps
//! /api/v1/config/{section}           - Update / inspect / remove a section's overrides
//! /api/v1/config/{section}/{name}    - Same, for a named section instance
//! ```

pub mod error;
pub mod handlers;
pub mod openapi;
pub mod responses;
pub mod routes;

pub use error::{error_codes, ErrorResponse};
pub use handlers::health_check;
pub use openapi::ApiDocV1;
pub use responses::HealthResponse;
pub use routes::build_v1_router;
