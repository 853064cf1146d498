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

//! The capability gate: predicates an actor type places on the host it runs on.
//!
//! Predicates are evaluated once per placement decision, before an instance is
//! constructed, and never again for a running actor. Stacked predicates compose
//! conjunctively, so the order they were added in does not matter.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::common::{Capabilities, CapabilityCheck, CapabilityValue, Requirements};
use crate::message::CreateError;

/// The conjunction of every capability predicate attached to an actor type.
#[derive(Clone, Default)]
pub struct CapabilityGate {
    checks: Vec<CapabilityCheck>,
}

impl CapabilityGate {
    /// Adds a predicate. All predicates must pass for placement to succeed.
    pub fn require<F>(&mut self, check: F) -> &mut Self
    where
        F: Fn(&Capabilities, &Requirements) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Arc::new(check));
        self
    }

    /// Whether a host with `capabilities` may run an instance created with `requirements`.
    #[must_use]
    pub fn admits(&self, capabilities: &Capabilities, requirements: &Requirements) -> bool {
        self.checks
            .iter()
            .all(|check| check(capabilities, requirements))
    }

    /// Number of stacked predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether no predicates are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl fmt::Debug for CapabilityGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityGate")
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// Something that can host actors and advertises capabilities.
///
/// The local [`ActorRuntime`](crate::common::ActorRuntime) is one; a clustered
/// deployment supplies one per remote system.
pub trait CapabilityHost {
    /// A name for logs.
    fn host_name(&self) -> String;

    /// A snapshot of the host's current capabilities.
    fn capabilities(&self) -> Capabilities;
}

/// Chooses a host for a new actor instance.
#[derive(Debug, Clone, Copy)]
pub struct Placement;

impl Placement {
    /// Returns the first candidate whose capabilities pass `gate`.
    ///
    /// The gate is evaluated once per candidate, in order, and evaluation stops
    /// at the first match.
    ///
    /// # Errors
    ///
    /// [`CreateError::NoCompatibleHost`] when every candidate is rejected.
    pub fn place<'h, H>(
        candidates: impl IntoIterator<Item = &'h H>,
        gate: &CapabilityGate,
        requirements: &Requirements,
        actor_type: &str,
    ) -> Result<&'h H, CreateError>
    where
        H: CapabilityHost + ?Sized + 'h,
    {
        for candidate in candidates {
            if gate.admits(&candidate.capabilities(), requirements) {
                trace!("Placing {actor_type} on {}", candidate.host_name());
                return Ok(candidate);
            }
            trace!("{} rejected {actor_type}", candidate.host_name());
        }
        Err(CreateError::NoCompatibleHost {
            actor_type: actor_type.to_string(),
        })
    }
}

/// Passes when the host has `name` with a truthy value.
pub fn requires_capability(
    name: impl Into<String>,
) -> impl Fn(&Capabilities, &Requirements) -> bool + Send + Sync + 'static {
    let name = name.into();
    move |capabilities: &Capabilities, _requirements: &Requirements| capabilities.has(&name)
}

/// Passes when the host has `name` equal to `value`.
pub fn requires_value(
    name: impl Into<String>,
    value: impl Into<CapabilityValue>,
) -> impl Fn(&Capabilities, &Requirements) -> bool + Send + Sync + 'static {
    let name = name.into();
    let value = value.into();
    move |capabilities: &Capabilities, _requirements: &Requirements| {
        capabilities.get(&name) == Some(&value)
    }
}

/// Passes when every entry of the creation's requirement map is matched by an
/// equal host capability.
pub fn requirements_satisfied(
) -> impl Fn(&Capabilities, &Requirements) -> bool + Send + Sync + 'static {
    |capabilities: &Capabilities, requirements: &Requirements| {
        requirements
            .iter()
            .all(|(name, value)| capabilities.get(name) == Some(value))
    }
}
