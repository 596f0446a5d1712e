// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
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

//! Emulator configuration
//!
//! Configuration is a TOML file with one table per component:
//!
//! ```toml
//! [geometry]
//! command_latency = 1
//! strict_commands = false
//! ```
//!
//! Missing keys take their defaults. `DSRX_COMMAND_LATENCY` and
//! `DSRX_STRICT_COMMANDS` override the file when set.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{EmulatorError, Result};
use super::timing::TickCount;

/// Environment variable overriding `geometry.command_latency`
pub const ENV_COMMAND_LATENCY: &str = "DSRX_COMMAND_LATENCY";

/// Environment variable overriding `geometry.strict_commands`
pub const ENV_STRICT_COMMANDS: &str = "DSRX_STRICT_COMMANDS";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geometry: GeometryConfig,
}

/// Geometry engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Ticks the engine stays busy after each command
    pub command_latency: TickCount,

    /// Treat unknown commands and unsupported texture transforms as errors
    pub strict_commands: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            command_latency: 1,
            strict_commands: false,
        }
    }
}

impl Config {
    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use dsrx::core::config::Config;
    ///
    /// let config = Config::from_toml_str("[geometry]\ncommand_latency = 4\n").unwrap();
    /// assert_eq!(config.geometry.command_latency, 4);
    /// assert!(!config.geometry.strict_commands);
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| EmulatorError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EmulatorError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| EmulatorError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// Apply `DSRX_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_COMMAND_LATENCY) {
            self.geometry.command_latency = value.trim().parse().map_err(|_| {
                EmulatorError::Config(format!("{} must be an integer, got {:?}", ENV_COMMAND_LATENCY, value))
            })?;
        }

        if let Some(value) = lookup(ENV_STRICT_COMMANDS) {
            self.geometry.strict_commands = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(EmulatorError::Config(format!(
                        "{} must be a boolean, got {:?}",
                        ENV_STRICT_COMMANDS, value
                    )))
                }
            };
        }

        if self.geometry.command_latency < 0 {
            return Err(EmulatorError::Config(format!(
                "command_latency must not be negative, got {}",
                self.geometry.command_latency
            )));
        }

        Ok(())
    }
}
