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

//! The override engine façade.
//!
//! [`OverrideEngine`] holds an immutable configuration object and applies
//! dynamically-typed override sets to named sections of it, returning the
//! freshly modified section value. The original is never mutated: every call
//! first takes a deep copy, so a failed call is never partially observable.
//!
//! The engine is synchronous and performs no I/O; a shared instance may be
//! used from multiple threads concurrently.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::namer::{raw_field_name, FieldNameFn};
use super::schema::{ConfigSchema, Overridable};
use super::snapshot;
use super::walker::{ApplyError, SectionWalker};

/// An override set: external option names mapped to dynamically-typed
/// values, in insertion order.
pub type OverrideSet = IndexMap<String, Value>;

/// Failure of a single override call.
///
/// Every variant is terminal for the call; no partial update is observable.
#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("section cannot be empty")]
    EmptySection,

    #[error("failed to copy configuration object: {0}")]
    Snapshot(#[source] serde_json::Error),

    #[error("unknown section {section}")]
    UnknownSection { section: String },

    #[error("unknown options {options:?} in section {section}")]
    UnknownOptions {
        section: String,
        options: Vec<String>,
    },

    #[error("failed to apply changes to configuration object for section {section}: {source}")]
    Apply {
        section: String,
        #[source]
        source: ApplyError,
    },

    #[error("failed to decode value for section {section}: {source}")]
    Decode {
        section: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Applies override sets to sections of a retained configuration object.
pub struct OverrideEngine<C> {
    /// The original configuration value. It is never modified; only copies
    /// are modified.
    original: C,
    schema: ConfigSchema,
    /// Determines the external name of each option field. Defaults to
    /// [`raw_field_name`].
    pub field_name_fn: FieldNameFn,
}

impl<C> OverrideEngine<C>
where
    C: Overridable + Serialize,
{
    /// Create an engine that will apply overrides to `config`.
    pub fn new(config: C) -> Self {
        Self {
            original: config,
            schema: C::schema(),
            field_name_fn: raw_field_name,
        }
    }

    /// Builder-style override of the field naming function.
    pub fn with_field_name_fn(mut self, field_name_fn: FieldNameFn) -> Self {
        self.field_name_fn = field_name_fn;
        self
    }

    /// The retained original configuration.
    pub fn original(&self) -> &C {
        &self.original
    }

    /// Apply `set` to the section identified by `section`, returning the
    /// modified section value.
    ///
    /// `name` is reserved for addressing named instances of a section type
    /// and does not currently influence matching.
    ///
    /// # Errors
    ///
    /// Fails if `section` is empty, unknown, or if any key of `set` does not
    /// resolve to an option of the section or cannot be coerced to the
    /// option's declared kind. The retained original is unchanged in every
    /// case.
    pub fn apply(
        &self,
        section: &str,
        name: &str,
        set: &OverrideSet,
    ) -> Result<Value, OverrideError> {
        if section.is_empty() {
            return Err(OverrideError::EmptySection);
        }
        let mut tree = snapshot::deep_copy(&self.original).map_err(OverrideError::Snapshot)?;

        let mut walker = SectionWalker::new(section, name, set, self.field_name_fn);
        walker
            .walk(&mut tree, &self.schema)
            .map_err(|source| OverrideError::Apply {
                section: section.to_string(),
                source,
            })?;

        let unused = walker.unused();
        match walker.into_section_value() {
            None => Err(OverrideError::UnknownSection {
                section: section.to_string(),
            }),
            Some(_) if !unused.is_empty() => Err(OverrideError::UnknownOptions {
                section: section.to_string(),
                options: unused,
            }),
            Some(value) => Ok(value),
        }
    }

    /// Like [`apply`](Self::apply), decoding the section value into `S`.
    pub fn apply_as<S: DeserializeOwned>(
        &self,
        section: &str,
        name: &str,
        set: &OverrideSet,
    ) -> Result<S, OverrideError> {
        let value = self.apply(section, name, set)?;
        serde_json::from_value(value).map_err(|source| OverrideError::Decode {
            section: section.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::coerce::CoerceError;
    use crate::overlay::namer::{json_field_name, toml_field_name};
    use crate::overlay::schema::{FieldDescriptor, FieldKind, SectionSchema};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct General {
        hostname: String,
        data_dir: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Retention {
        period: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    struct Fixture {
        general: General,
        retention: Option<Retention>,
        // Not a section; must be invisible to the engine.
        comment: String,
    }

    impl Overridable for Fixture {
        fn schema() -> ConfigSchema {
            ConfigSchema::new()
                .with_section(
                    SectionSchema::new("general", "general")
                        .with_field(
                            FieldDescriptor::new("hostname", FieldKind::String)
                                .with_tag("toml", "host-name")
                                .with_tag("json", "hostName"),
                        )
                        .with_field(
                            FieldDescriptor::new("data_dir", FieldKind::String)
                                .with_tag("toml", "data-dir,omitempty")
                                .with_tag("json", "dataDir"),
                        ),
                )
                .with_section(
                    SectionSchema::new("retention", "retention")
                        .with_field(FieldDescriptor::new("period", FieldKind::I64)),
                )
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            general: General {
                hostname: "localhost".to_string(),
                data_dir: "/var/lib/overlay".to_string(),
            },
            retention: Some(Retention { period: -1 }),
            comment: "untouched".to_string(),
        }
    }

    fn set_of(pairs: &[(&str, Value)]) -> OverrideSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_apply_returns_modified_section_only() {
        let engine = OverrideEngine::new(fixture());
        let value = engine
            .apply("general", "", &set_of(&[("hostname", json!("example.com"))]))
            .unwrap();

        assert_eq!(
            value,
            json!({"hostname": "example.com", "data_dir": "/var/lib/overlay"})
        );
    }

    #[test]
    fn test_apply_as_decodes_section_value() {
        let engine = OverrideEngine::new(fixture());
        let general: General = engine
            .apply_as("general", "", &set_of(&[("hostname", json!("example.com"))]))
            .unwrap();

        assert_eq!(
            general,
            General {
                hostname: "example.com".to_string(),
                data_dir: "/var/lib/overlay".to_string(),
            }
        );
    }

    #[test]
    fn test_original_is_never_mutated() {
        let engine = OverrideEngine::new(fixture());
        let before = snapshot::deep_copy(engine.original()).unwrap();

        engine
            .apply("general", "", &set_of(&[("hostname", json!("changed"))]))
            .unwrap();
        let _ = engine.apply("general", "", &set_of(&[("hostname", json!(42))]));
        let _ = engine.apply("missing", "", &OverrideSet::new());

        assert!(snapshot::structural_eq(engine.original(), &before));
    }

    #[test]
    fn test_indirect_section_is_returned_dereferenced() {
        let engine = OverrideEngine::new(fixture());
        let retention: Retention = engine
            .apply_as("retention", "", &set_of(&[("period", json!(42))]))
            .unwrap();

        assert_eq!(retention, Retention { period: 42 });
    }

    #[test]
    fn test_empty_section_is_rejected() {
        let engine = OverrideEngine::new(fixture());
        let err = engine.apply("", "", &OverrideSet::new()).unwrap_err();
        assert!(matches!(err, OverrideError::EmptySection));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let engine = OverrideEngine::new(fixture());
        let err = engine
            .apply("unknown", "", &set_of(&[("hostname", json!("x"))]))
            .unwrap_err();
        assert!(
            matches!(err, OverrideError::UnknownSection { ref section } if section == "unknown")
        );
    }

    #[test]
    fn test_unknown_options_are_all_named() {
        let engine = OverrideEngine::new(fixture());
        let err = engine
            .apply(
                "general",
                "",
                &set_of(&[
                    ("hostname", json!("x")),
                    ("typo", json!("y")),
                    ("other", json!(1)),
                ]),
            )
            .unwrap_err();

        match err {
            OverrideError::UnknownOptions { section, options } => {
                assert_eq!(section, "general");
                assert_eq!(options, vec!["typo".to_string(), "other".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_type_mismatch_is_wrapped_with_section_and_option() {
        let engine = OverrideEngine::new(fixture());
        let err = engine
            .apply("general", "", &set_of(&[("hostname", json!(123))]))
            .unwrap_err();

        match err {
            OverrideError::Apply { section, source } => {
                assert_eq!(section, "general");
                assert_eq!(source.option, "hostname");
                assert!(matches!(source.source, CoerceError::TypeMismatch { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unset_indirection_is_not_settable() {
        let mut config = fixture();
        config.retention = None;
        let engine = OverrideEngine::new(config);

        let err = engine
            .apply("retention", "", &set_of(&[("period", json!(7))]))
            .unwrap_err();
        match err {
            OverrideError::Apply { source, .. } => {
                assert!(matches!(source.source, CoerceError::NotSettable));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_namer_is_raw() {
        let engine = OverrideEngine::new(fixture());
        let err = engine
            .apply("general", "", &set_of(&[("host-name", json!("x"))]))
            .unwrap_err();
        assert!(matches!(err, OverrideError::UnknownOptions { .. }));
    }

    #[test]
    fn test_namer_is_reassignable() {
        let mut engine = OverrideEngine::new(fixture());
        engine.field_name_fn = toml_field_name;
        let general: General = engine
            .apply_as("general", "", &set_of(&[("host-name", json!("a"))]))
            .unwrap();
        assert_eq!(general.hostname, "a");

        engine.field_name_fn = json_field_name;
        let general: General = engine
            .apply_as("general", "", &set_of(&[("hostName", json!("b"))]))
            .unwrap();
        assert_eq!(general.hostname, "b");
    }

    #[test]
    fn test_builder_style_namer() {
        let engine = OverrideEngine::new(fixture()).with_field_name_fn(toml_field_name);
        let general: General = engine
            .apply_as("general", "", &set_of(&[("data-dir", json!("/tmp"))]))
            .unwrap();
        assert_eq!(general.data_dir, "/tmp");
    }

    #[test]
    fn test_empty_set_returns_section_as_stored() {
        let engine = OverrideEngine::new(fixture());
        let general: General = engine.apply_as("general", "", &OverrideSet::new()).unwrap();
        assert_eq!(general, fixture().general);
    }

    #[test]
    fn test_name_parameter_does_not_influence_matching() {
        let engine = OverrideEngine::new(fixture());
        let a = engine
            .apply("general", "", &set_of(&[("hostname", json!("x"))]))
            .unwrap();
        let b = engine
            .apply("general", "primary", &set_of(&[("hostname", json!("x"))]))
            .unwrap();
        assert_eq!(a, b);
    }
}
