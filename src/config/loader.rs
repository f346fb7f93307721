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

//! Configuration file loading with environment variable interpolation.
//!
//! Files are parsed as YAML first with a JSON fallback, after `${VAR}` /
//! `${VAR:-default}` references have been expanded.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use super::env_interpolation::{self, InterpolationError};
use super::types::ServerConfig;

/// Unified error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("environment variable interpolation failed: {0}")]
    Interpolation(#[from] InterpolationError),

    #[error("failed to parse config file '{path}': YAML error: {yaml_err}, JSON error: {json_err}")]
    Parse {
        path: String,
        yaml_err: String,
        json_err: String,
    },

    #[error("validation error: {0}")]
    Validation(#[from] anyhow::Error),
}

/// Deserialize a YAML string after interpolating environment variables.
pub fn from_yaml_str<T: DeserializeOwned>(s: &str) -> Result<T, ConfigError> {
    let interpolated = env_interpolation::interpolate(s)?;
    Ok(serde_yaml::from_str(&interpolated)?)
}

/// Deserialize a JSON string after interpolating environment variables.
pub fn from_json_str<T: DeserializeOwned>(s: &str) -> Result<T, ConfigError> {
    let interpolated = env_interpolation::interpolate(s)?;
    Ok(serde_json::from_str(&interpolated)?)
}

/// Load and validate a [`ServerConfig`] from a YAML or JSON file.
///
/// # Errors
///
/// Fails if the file cannot be read, a required environment variable is
/// missing, the content is neither valid YAML nor valid JSON, or the
/// resulting configuration does not validate.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<ServerConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let interpolated = env_interpolation::interpolate(&content)?;

    let config = match serde_yaml::from_str::<ServerConfig>(&interpolated) {
        Ok(config) => config,
        Err(yaml_err) => match serde_json::from_str::<ServerConfig>(&interpolated) {
            Ok(config) => config,
            Err(json_err) => {
                return Err(ConfigError::Parse {
                    path: path.display().to_string(),
                    yaml_err: yaml_err.to_string(),
                    json_err: json_err.to_string(),
                });
            }
        },
    };

    config.validate()?;
    Ok(config)
}

/// Save a [`ServerConfig`] to a YAML file.
///
/// Interpolated values are written as-is; `${...}` references are not
/// reconstructed.
pub fn save_config_file<P: AsRef<Path>>(config: &ServerConfig, path: P) -> Result<(), ConfigError> {
    let content = serde_yaml::to_string(config)?;
    Ok(fs::write(path, content)?)
}
