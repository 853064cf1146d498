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

//! Runtime entry points and the pieces shared across the crate.
//!
//! *   [`Ensemble`]: launches a runtime.
//! *   [`ActorRuntime`]: the running system, used to create top-level actors,
//!     send from outside any actor and shut down.
//! *   [`EnsembleConfig`]: XDG/TOML configuration.
//! *   [`Reply`] / [`Handled`]: handler return values, including the defer sentinel.
//! *   [`Capabilities`] / [`Requirements`]: host capability maps.

pub use actor_reply::{Handled, Reply};
pub use actor_runtime::ActorRuntime;
pub use capabilities::{Capabilities, CapabilityValue, Requirements};
pub use config::{
    DefaultsConfig, EnsembleConfig, LimitsConfig, TimeoutConfig, TroupeConfig,
};
pub use ensemble::Ensemble;
pub use types::{CapabilityCheck, HandlerFuture};

pub(crate) use types::{ErasedHandler, FallbackHandler, LifecycleHook};

/// Defines the `Reply` helpers and the `Handled` sentinel.
mod actor_reply;
/// Defines the `ActorRuntime` for managing the system.
mod actor_runtime;
/// Defines host capability maps.
mod capabilities;
/// Defines the configuration system.
pub(crate) mod config;
/// Defines the `Ensemble` entry point.
mod ensemble;
/// Defines the internal state shared by runtime clones.
pub(crate) mod runtime_inner;
/// Defines shared type aliases.
mod types;
