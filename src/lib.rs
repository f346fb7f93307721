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

pub mod alerts;
pub mod api;
pub mod config;
pub mod overlay;
pub mod server;
pub mod service;
pub mod store;

// Main exports for library users
pub use config::{load_config_file, save_config_file, ConfigError, ServerConfig};
pub use overlay::{
    json_field_name, raw_field_name, toml_field_name, OverrideEngine, OverrideError, OverrideSet,
    Overridable,
};
pub use server::OverlayServer;
pub use service::{ConfigService, ConfigUpdate, UpdateAction};
pub use store::{FileOverrideStore, MemoryOverrideStore, Override, OverrideStore};
