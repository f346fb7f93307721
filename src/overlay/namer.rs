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

//! Field naming functions.
//!
//! A [`FieldNameFn`] maps a field descriptor to the external name by which
//! the field is addressed in an override set. The engine defaults to
//! [`raw_field_name`]; callers working with TOML- or JSON-shaped override
//! keys substitute [`toml_field_name`] or [`json_field_name`].

use super::schema::FieldDescriptor;

/// Pure function from a field descriptor to the field's external name.
pub type FieldNameFn = fn(&FieldDescriptor) -> String;

/// Returns the declared field name verbatim.
pub fn raw_field_name(field: &FieldDescriptor) -> String {
    field.name().to_string()
}

/// Returns the name of a field based on its `toml` tag.
pub fn toml_field_name(field: &FieldDescriptor) -> String {
    tag_field_name("toml", field)
}

/// Returns the name of a field based on its `json` tag.
pub fn json_field_name(field: &FieldDescriptor) -> String {
    tag_field_name("json", field)
}

/// Returns the name of a field based on the value of the given tag.
///
/// Everything after a `,` in the tag value is ignored. An absent or empty
/// tag falls back to the declared field name.
pub fn tag_field_name(tag: &str, field: &FieldDescriptor) -> String {
    let name = field
        .tag(tag)
        .and_then(|value| value.split(',').next())
        .unwrap_or("");
    if name.is_empty() {
        field.name().to_string()
    } else {
        name.to_string()
    }
}
