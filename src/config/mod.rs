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

//! Server configuration.
//!
//! The server loads its own configuration from a YAML or JSON file with
//! POSIX-style environment variable interpolation (`${VAR}`,
//! `${VAR:-default}`), and the same configuration doubles as the overridable
//! configuration served by the HTTP API.
//!
//! ```yaml
//! http:
//!   bind_address: "${OVERLAY_HOST:-0.0.0.0}"
//!   port: "${OVERLAY_PORT:-7090}"
//! storage:
//!   path: data/overrides.yaml
//! logging:
//!   level: "${LOG_LEVEL:-info}"
//! ```

pub mod env_interpolation;
pub mod loader;
pub mod types;

pub use loader::{from_json_str, from_yaml_str, load_config_file, save_config_file, ConfigError};
pub use types::{AlertSettings, HttpSettings, LogSettings, ServerConfig, StorageSettings};
