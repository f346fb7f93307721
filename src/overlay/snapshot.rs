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

//! Deep copies of configuration objects.
//!
//! The engine never mutates the configuration it was constructed with; every
//! call works on an independent copy produced here. The copy is a
//! serialization round-trip into a dynamic [`Value`] tree: aggregates are
//! recursed, indirections are flattened by value, scalars are copied by
//! value. Aliasing inside the original is not preserved, and cyclic
//! configuration objects are not supported.

use serde::Serialize;
use serde_json::Value;

/// Produce an independent structural copy of `config`.
///
/// Mutations of the returned tree are invisible through the original.
pub fn deep_copy<C: Serialize>(config: &C) -> Result<Value, serde_json::Error> {
    serde_json::to_value(config)
}

/// Whether two values have identical serialized structure.
///
/// Used to assert that an original configuration survived a call unchanged.
pub fn structural_eq<A: Serialize, B: Serialize>(a: &A, b: &B) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Inner {
        value: i32,
    }

    #[derive(Serialize)]
    struct Outer {
        name: String,
        direct: Inner,
        boxed: Box<Inner>,
        optional: Option<Inner>,
        absent: Option<Inner>,
        scalars: Vec<u8>,
    }

    fn fixture() -> Outer {
        Outer {
            name: "fixture".to_string(),
            direct: Inner { value: 1 },
            boxed: Box::new(Inner { value: 2 }),
            optional: Some(Inner { value: 3 }),
            absent: None,
            scalars: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_copy_recurses_aggregates() {
        let copy = deep_copy(&fixture()).unwrap();
        assert_eq!(copy["direct"], json!({"value": 1}));
        assert_eq!(copy["scalars"], json!([1, 2, 3]));
    }

    #[test]
    fn test_copy_flattens_single_indirection() {
        let copy = deep_copy(&fixture()).unwrap();
        assert_eq!(copy["boxed"], json!({"value": 2}));
        assert_eq!(copy["optional"], json!({"value": 3}));
        assert_eq!(copy["absent"], Value::Null);
    }

    #[test]
    fn test_mutating_copy_leaves_original_intact() {
        let original = fixture();
        let before = deep_copy(&original).unwrap();

        let mut copy = deep_copy(&original).unwrap();
        copy["direct"]["value"] = json!(99);
        copy["name"] = json!("mutated");

        assert!(structural_eq(&original, &before));
        assert_eq!(copy["direct"]["value"], json!(99));
    }

    #[test]
    fn test_structural_eq_detects_differences() {
        let a = Inner { value: 1 };
        let b = Inner { value: 2 };
        assert!(structural_eq(&a, &a));
        assert!(!structural_eq(&a, &b));
    }
}
