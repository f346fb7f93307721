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

//! Environment variable interpolation for configuration files.
//!
//! Replaces POSIX-style references before a configuration string is parsed:
//! `${VAR}` substitutes the variable's value, `${VAR:-default}` falls back to
//! `default` when the variable is unset or empty. Malformed references are
//! left untouched, expansion is not recursive, and the result size is capped.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::env;

/// Upper bound on the interpolated result, to keep a runaway variable from
/// exhausting memory.
const MAX_RESULT_LEN: usize = 1_048_576; // 1 MiB

lazy_static! {
    // ${NAME} or ${NAME:-default}; NAME follows POSIX naming rules.
    static ref REFERENCE: Regex =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("invalid regex");
}

/// Errors raised while interpolating a configuration string.
#[derive(Debug, thiserror::Error)]
pub enum InterpolationError {
    #[error("environment variable '{name}' is not set and has no default value")]
    MissingVariable { name: String },

    #[error("interpolated configuration exceeds {MAX_RESULT_LEN} bytes")]
    ResultTooLarge,
}

/// Expand all environment variable references in `input`.
pub fn interpolate(input: &str) -> Result<String, InterpolationError> {
    let mut output = String::with_capacity(input.len());
    let mut cursor = 0;
    let mut expanded = Vec::new();

    for caps in REFERENCE.captures_iter(input) {
        let reference = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let fallback = caps.get(2).map(|m| m.as_str());

        output.push_str(&input[cursor..reference.start()]);

        let value = match env::var(name) {
            Ok(value) if !value.is_empty() => value,
            _ => match fallback {
                Some(fallback) => fallback.to_string(),
                None => {
                    return Err(InterpolationError::MissingVariable {
                        name: name.to_string(),
                    });
                }
            },
        };

        output.push_str(&value);
        cursor = reference.end();
        expanded.push(name);

        if output.len() > MAX_RESULT_LEN {
            return Err(InterpolationError::ResultTooLarge);
        }
    }
    output.push_str(&input[cursor..]);

    if !expanded.is_empty() {
        debug!("interpolated environment variables: {}", expanded.join(", "));
    }

    Ok(output)
}
