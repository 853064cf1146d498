/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::path::Path;
use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::common::Capabilities;

/// Configuration for the Ensemble runtime.
///
/// Loaded from TOML in XDG-compliant directories. Every section and field is
/// optional; missing values take their defaults.
///
/// ```toml
/// [timeouts]
/// actor_shutdown_timeout_ms = 10000
/// system_shutdown_timeout_ms = 30000
/// ask_timeout_ms = 5000
///
/// [limits]
/// handler_retry_count = 1
///
/// [troupe]
/// max_count = 10
/// idle_count = 2
/// grace_period_ms = 2000
///
/// [defaults]
/// actor_name = "actor"
///
/// [capabilities]
/// gpu = true
/// region = "eu-west"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Limits configuration
    pub limits: LimitsConfig,
    /// Default troupe sizing
    pub troupe: TroupeConfig,
    /// Default values configuration
    pub defaults: DefaultsConfig,
    /// Capabilities this host offers to the placement gate
    pub capabilities: Capabilities,
}

/// Timeout-related configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long an exiting actor waits for each child, in milliseconds
    pub actor_shutdown_timeout_ms: u64,
    /// How long `shutdown_all` waits before force-cancelling, in milliseconds
    pub system_shutdown_timeout_ms: u64,
    /// Timeout used by `ask_default`, in milliseconds
    pub ask_timeout_ms: u64,
}

/// Limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// How many times a message whose handler panicked is retried before it is poisoned
    pub handler_retry_count: u32,
}

/// Defaults for actor types declared with `TroupeSettings::default()`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TroupeConfig {
    /// Hard ceiling on concurrently live workers
    pub max_count: usize,
    /// Workers kept warm with no work
    pub idle_count: usize,
    /// Delay before surplus idle workers are dismissed, in milliseconds
    pub grace_period_ms: u64,
}

/// Default values configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Name used when neither the creation config nor the actor type supplies one
    pub actor_name: String,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            actor_shutdown_timeout_ms: 10_000,
            system_shutdown_timeout_ms: 30_000,
            ask_timeout_ms: 5_000,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            handler_retry_count: 1,
        }
    }
}

impl Default for TroupeConfig {
    fn default() -> Self {
        Self {
            max_count: 10,
            idle_count: 2,
            grace_period_ms: 2_000,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            actor_name: "actor".to_string(),
        }
    }
}

impl EnsembleConfig {
    /// Actor shutdown timeout as a `Duration`
    pub const fn actor_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.actor_shutdown_timeout_ms)
    }

    /// System shutdown timeout as a `Duration`
    pub const fn system_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.system_shutdown_timeout_ms)
    }

    /// Default ask timeout as a `Duration`
    pub const fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.ask_timeout_ms)
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `ensemble/config.toml` under `$XDG_CONFIG_HOME` and then the
    /// XDG config directories. If no file is found, or the file cannot be read
    /// or parsed, logs the reason and returns the default configuration.
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("ensemble") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            Self::load_from(&path)
        } else {
            info!("No configuration file found, using defaults");
            Self::default()
        }
    }

    /// Load configuration from an explicit file, falling back to defaults on error.
    pub fn load_from(path: &Path) -> Self {
        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(config_str) => match toml::from_str::<Self>(&config_str) {
                Ok(config) => {
                    info!("Successfully loaded configuration");
                    config
                }
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: EnsembleConfig = EnsembleConfig::load();
}
