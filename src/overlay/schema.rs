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

//! Runtime description of an overridable configuration type.
//!
//! Rust has no runtime reflection, so the metadata the engine needs — which
//! top-level fields are sections, what each option is called in external
//! formats, and what scalar kind each option holds — is registered as a
//! [`ConfigSchema`] built through a small builder API. A configuration type
//! makes itself overridable by implementing [`Overridable`]:
//!
//! ```
//! use overlay_server::overlay::{ConfigSchema, FieldDescriptor, FieldKind, Overridable, SectionSchema};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct AppConfig {
//!     http: HttpSettings,
//! }
//!
//! #[derive(Serialize)]
//! struct HttpSettings {
//!     port: u16,
//! }
//!
//! impl Overridable for AppConfig {
//!     fn schema() -> ConfigSchema {
//!         ConfigSchema::new().with_section(
//!             SectionSchema::new("http", "http")
//!                 .with_field(FieldDescriptor::new("port", FieldKind::U16)),
//!         )
//!     }
//! }
//! ```

use std::fmt;

/// Declared scalar kind of an option field.
///
/// Pointer-width kinds (`Isize`/`Usize`) follow the host's pointer width.
/// `Opaque` marks a field the engine treats as a single indivisible slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
    Bool,
    Opaque,
}

impl FieldKind {
    /// Whether this kind is a signed integer of any width.
    pub fn is_signed_int(self) -> bool {
        matches!(
            self,
            FieldKind::I8 | FieldKind::I16 | FieldKind::I32 | FieldKind::I64 | FieldKind::Isize
        )
    }

    /// Whether this kind is an unsigned integer of any width.
    pub fn is_unsigned_int(self) -> bool {
        matches!(
            self,
            FieldKind::U8 | FieldKind::U16 | FieldKind::U32 | FieldKind::U64 | FieldKind::Usize
        )
    }

    /// Whether this kind is a floating point number.
    pub fn is_float(self) -> bool {
        matches!(self, FieldKind::F32 | FieldKind::F64)
    }

    /// Whether this kind participates in weak numeric coercion.
    pub fn is_numeric(self) -> bool {
        self.is_signed_int() || self.is_unsigned_int() || self.is_float()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::I8 => "i8",
            FieldKind::I16 => "i16",
            FieldKind::I32 => "i32",
            FieldKind::I64 => "i64",
            FieldKind::Isize => "isize",
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::U32 => "u32",
            FieldKind::U64 => "u64",
            FieldKind::Usize => "usize",
            FieldKind::F32 => "f32",
            FieldKind::F64 => "f64",
            FieldKind::String => "string",
            FieldKind::Bool => "bool",
            FieldKind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// Description of a single option field within a section.
///
/// Carries the declared (serialized) field name, the declared kind, and any
/// number of `(tag, value)` pairs supplying alternate external names. Tag
/// values may be comma-separated lists; only the first element names the
/// field (see [`tag_field_name`](super::namer::tag_field_name)).
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    tags: Vec<(String, String)>,
}

impl FieldDescriptor {
    /// Create a descriptor for a field with the given declared name and kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            tags: Vec::new(),
        }
    }

    /// Attach a tag, e.g. `with_tag("toml", "bind-address,omitempty")`.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// The declared field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Look up the raw value of a tag by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Description of one top-level section of a configuration type.
#[derive(Debug, Clone)]
pub struct SectionSchema {
    field_name: String,
    override_tag: String,
    fields: Vec<FieldDescriptor>,
}

impl SectionSchema {
    /// Create a section schema for the top-level field `field_name` whose
    /// `override` tag is `override_tag`. Only the first comma-separated
    /// element of the tag identifies the section.
    pub fn new(field_name: impl Into<String>, override_tag: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            override_tag: override_tag.into(),
            fields: Vec::new(),
        }
    }

    /// Register an option field of this section.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// The declared name of the top-level field holding this section.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The section identity: the first comma-separated element of the
    /// `override` tag.
    pub fn section_tag(&self) -> &str {
        self.override_tag
            .split(',')
            .next()
            .unwrap_or(&self.override_tag)
    }

    /// Look up an option descriptor by declared field name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// All option descriptors, in registration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// Complete override schema of a configuration type: its sections and their
/// option fields.
#[derive(Debug, Clone, Default)]
pub struct ConfigSchema {
    sections: Vec<SectionSchema>,
}

impl ConfigSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a section.
    pub fn with_section(mut self, section: SectionSchema) -> Self {
        self.sections.push(section);
        self
    }

    /// Look up a section by the declared name of its top-level field.
    pub fn section_by_field(&self, field_name: &str) -> Option<&SectionSchema> {
        self.sections.iter().find(|s| s.field_name() == field_name)
    }

    /// All sections, in registration order.
    pub fn sections(&self) -> &[SectionSchema] {
        &self.sections
    }
}

/// Implemented by configuration types whose sections can be overridden.
pub trait Overridable {
    /// The override schema describing this type's sections and options.
    fn schema() -> ConfigSchema;
}
