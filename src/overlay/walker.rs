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

//! Section traversal and option application.
//!
//! The walker visits the top level of a copied configuration tree. Section
//! identity comes solely from the `override` tag registered in the schema;
//! the declared field name is never a fallback. Within the matching section
//! each option's external name is computed by the active naming function and
//! looked up in the override set; hits are weakly assigned in place. Nothing
//! below option depth is addressable.

use std::collections::HashSet;

use serde_json::Value;

use super::coerce::{weak_assign, CoerceError};
use super::engine::OverrideSet;
use super::namer::FieldNameFn;
use super::schema::{ConfigSchema, SectionSchema};

/// Failure to apply one option of the override set.
#[derive(Debug, thiserror::Error)]
#[error("cannot set option {option}: {source}")]
pub struct ApplyError {
    /// External name of the option that could not be set.
    pub option: String,
    #[source]
    pub source: CoerceError,
}

/// Single-use traversal over one copied configuration tree.
pub struct SectionWalker<'a> {
    section: &'a str,
    // Reserved for named section instances; not consulted when matching.
    #[allow(dead_code)]
    name: &'a str,
    set: &'a OverrideSet,
    field_name_fn: FieldNameFn,
    used: HashSet<String>,
    section_field: Option<String>,
    section_value: Option<Value>,
}

impl<'a> SectionWalker<'a> {
    pub fn new(
        section: &'a str,
        name: &'a str,
        set: &'a OverrideSet,
        field_name_fn: FieldNameFn,
    ) -> Self {
        Self {
            section,
            name,
            set,
            field_name_fn,
            used: HashSet::with_capacity(set.len()),
            section_field: None,
            section_value: None,
        }
    }

    /// Walk the top level of `tree`, applying the override set to the target
    /// section. A tree without a top-level record simply matches nothing.
    pub fn walk(&mut self, tree: &mut Value, schema: &ConfigSchema) -> Result<(), ApplyError> {
        let Some(root) = tree.as_object_mut() else {
            return Ok(());
        };
        for (field_name, slot) in root.iter_mut() {
            let Some(section) = schema.section_by_field(field_name) else {
                continue;
            };
            if section.section_tag() != self.section {
                continue;
            }
            self.apply_options(section, slot)?;
            self.section_field = Some(field_name.clone());
            self.section_value = Some(slot.clone());
        }
        Ok(())
    }

    fn apply_options(
        &mut self,
        section: &SectionSchema,
        slot: &mut Value,
    ) -> Result<(), ApplyError> {
        let Some(options) = slot.as_object_mut() else {
            // Unset indirection: the section exists but its options have no
            // storage to assign into.
            for field in section.fields() {
                let external = (self.field_name_fn)(field);
                if self.set.contains_key(&external) {
                    return Err(ApplyError {
                        option: external,
                        source: CoerceError::NotSettable,
                    });
                }
            }
            return Ok(());
        };
        for (field_name, value) in options.iter_mut() {
            let Some(field) = section.field(field_name) else {
                continue;
            };
            let external = (self.field_name_fn)(field);
            if let Some(src) = self.set.get(&external) {
                weak_assign(src, value, field.kind()).map_err(|source| ApplyError {
                    option: external.clone(),
                    source,
                })?;
                self.used.insert(external);
            }
        }
        Ok(())
    }

    /// Keys of the override set that no option consumed, in set order.
    pub fn unused(&self) -> Vec<String> {
        self.set
            .keys()
            .filter(|key| !self.used.contains(*key))
            .cloned()
            .collect()
    }

    /// Declared name of the matched section field, if one was encountered.
    pub fn section_field(&self) -> Option<&str> {
        self.section_field.as_deref()
    }

    /// The matched section's value after application.
    pub fn into_section_value(self) -> Option<Value> {
        self.section_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::namer::{raw_field_name, toml_field_name};
    use crate::overlay::schema::{ConfigSchema, FieldDescriptor, FieldKind};
    use serde_json::json;

    fn schema() -> ConfigSchema {
        ConfigSchema::new()
            .with_section(
                SectionSchema::new("http", "http")
                    .with_field(
                        FieldDescriptor::new("bind_address", FieldKind::String)
                            .with_tag("toml", "bind-address"),
                    )
                    .with_field(FieldDescriptor::new("port", FieldKind::U16)),
            )
            .with_section(
                SectionSchema::new("alerts", "alerts")
                    .with_field(FieldDescriptor::new("topic", FieldKind::String)),
            )
    }

    fn set_of(pairs: &[(&str, Value)]) -> OverrideSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_matching_section_is_updated_in_place() {
        let mut tree = json!({
            "http": {"bind_address": "0.0.0.0", "port": 8080},
            "alerts": {"topic": "updates"},
        });
        let set = set_of(&[("port", json!("9090"))]);
        let mut walker = SectionWalker::new("http", "", &set, raw_field_name);

        walker.walk(&mut tree, &schema()).unwrap();

        assert_eq!(walker.section_field(), Some("http"));
        assert!(walker.unused().is_empty());
        assert_eq!(tree["http"]["port"], json!(9090));
        assert_eq!(tree["alerts"]["topic"], json!("updates"));
        assert_eq!(
            walker.into_section_value().unwrap(),
            json!({"bind_address": "0.0.0.0", "port": 9090})
        );
    }

    #[test]
    fn test_section_identity_is_tag_not_field_name() {
        let schema = ConfigSchema::new().with_section(
            SectionSchema::new("http", "web")
                .with_field(FieldDescriptor::new("port", FieldKind::U16)),
        );
        let mut tree = json!({"http": {"port": 1}});
        let set = OverrideSet::new();

        let mut walker = SectionWalker::new("http", "", &set, raw_field_name);
        walker.walk(&mut tree, &schema).unwrap();
        assert!(walker.into_section_value().is_none());

        let mut walker = SectionWalker::new("web", "", &set, raw_field_name);
        walker.walk(&mut tree, &schema).unwrap();
        assert!(walker.into_section_value().is_some());
    }

    #[test]
    fn test_unmatched_keys_are_reported_unused() {
        let mut tree = json!({"http": {"bind_address": "a", "port": 1}});
        let set = set_of(&[("port", json!(2)), ("typo", json!("x"))]);
        let mut walker = SectionWalker::new("http", "", &set, raw_field_name);

        walker.walk(&mut tree, &schema()).unwrap();

        assert_eq!(walker.unused(), vec!["typo".to_string()]);
    }

    #[test]
    fn test_namer_controls_external_names() {
        let mut tree = json!({"http": {"bind_address": "a", "port": 1}});
        let set = set_of(&[("bind-address", json!("b"))]);
        let mut walker = SectionWalker::new("http", "", &set, toml_field_name);

        walker.walk(&mut tree, &schema()).unwrap();

        assert!(walker.unused().is_empty());
        assert_eq!(tree["http"]["bind_address"], json!("b"));
    }

    #[test]
    fn test_coercion_failure_names_the_option() {
        let mut tree = json!({"http": {"bind_address": "a", "port": 1}});
        let set = set_of(&[("bind_address", json!(5))]);
        let mut walker = SectionWalker::new("http", "", &set, raw_field_name);

        let err = walker.walk(&mut tree, &schema()).unwrap_err();
        assert_eq!(err.option, "bind_address");
        assert!(matches!(err.source, CoerceError::TypeMismatch { .. }));
    }

    #[test]
    fn test_null_section_rejects_supplied_options() {
        let mut tree = json!({"alerts": null});
        let set = set_of(&[("topic", json!("t"))]);
        let mut walker = SectionWalker::new("alerts", "", &set, raw_field_name);

        let err = walker.walk(&mut tree, &schema()).unwrap_err();
        assert_eq!(err.option, "topic");
        assert!(matches!(err.source, CoerceError::NotSettable));
    }

    #[test]
    fn test_null_section_with_empty_set_is_returned_as_stored() {
        let mut tree = json!({"alerts": null});
        let set = OverrideSet::new();
        let mut walker = SectionWalker::new("alerts", "", &set, raw_field_name);

        walker.walk(&mut tree, &schema()).unwrap();
        assert_eq!(walker.into_section_value(), Some(Value::Null));
    }

    #[test]
    fn test_non_record_tree_matches_nothing() {
        let mut tree = json!([1, 2, 3]);
        let set = OverrideSet::new();
        let mut walker = SectionWalker::new("http", "", &set, raw_field_name);

        walker.walk(&mut tree, &schema()).unwrap();
        assert!(walker.into_section_value().is_none());
    }
}
