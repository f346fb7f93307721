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

//! The configuration override engine.
//!
//! This module turns a strongly-typed configuration object plus a
//! dynamically-typed key/value map into a modified copy of one named
//! configuration section, coercing incoming values to the declared kind of
//! each field:
//!
//! ```
//! use overlay_server::overlay::{
//!     toml_field_name, ConfigSchema, FieldDescriptor, FieldKind, Overridable, OverrideEngine,
//!     OverrideSet, SectionSchema,
//! };
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct AppConfig {
//!     http: HttpSettings,
//! }
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct HttpSettings {
//!     port: u16,
//! }
//!
//! impl Overridable for AppConfig {
//!     fn schema() -> ConfigSchema {
//!         ConfigSchema::new().with_section(
//!             SectionSchema::new("http", "http")
//!                 .with_field(FieldDescriptor::new("port", FieldKind::U16).with_tag("toml", "port")),
//!         )
//!     }
//! }
//!
//! let engine = OverrideEngine::new(AppConfig::default()).with_field_name_fn(toml_field_name);
//!
//! let mut set = OverrideSet::new();
//! set.insert("port".to_string(), json!("9090"));
//!
//! let http: HttpSettings = engine.apply_as("http", "", &set).unwrap();
//! assert_eq!(http.port, 9090);
//! ```
//!
//! The engine never mutates the configuration it retains; every call applies
//! the set to a deep copy, so failed calls leave nothing half-updated.

pub mod coerce;
pub mod engine;
pub mod namer;
pub mod schema;
pub mod snapshot;
pub mod walker;

// Re-export the public surface of the engine.
pub use coerce::{CoerceError, ValueKind};
pub use engine::{OverrideEngine, OverrideError, OverrideSet};
pub use namer::{json_field_name, raw_field_name, tag_field_name, toml_field_name, FieldNameFn};
pub use schema::{ConfigSchema, FieldDescriptor, FieldKind, Overridable, SectionSchema};
pub use snapshot::{deep_copy, structural_eq};
pub use walker::{ApplyError, SectionWalker};
