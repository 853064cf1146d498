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

use crate::common::{CapabilityValue, Requirements};

/// Per-creation options for a new actor instance.
///
/// ```ignore
/// let config = ActorConfig::new_with_name("ledger")
///     .with_global_name("ledger")
///     .with_requirement("region", "eu-west");
/// let ledger = runtime.create_actor(&ledger_type, config)?;
/// ```
#[derive(Default, Debug, Clone)]
pub struct ActorConfig {
    name: Option<String>,
    requirements: Requirements,
    global_name: Option<String>,
    source_ref: Option<String>,
}

impl ActorConfig {
    /// A config that names the new instance.
    pub fn new_with_name(name: impl Into<String>) -> Self {
        Self::default().with_name(name)
    }

    /// Sets the root segment of the instance's id. Defaults to the actor type's name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds one requirement checked by the actor type's capability predicates.
    #[must_use]
    pub fn with_requirement(
        mut self,
        name: impl Into<String>,
        value: impl Into<CapabilityValue>,
    ) -> Self {
        self.requirements.set(name, value);
        self
    }

    /// Replaces the requirement map.
    #[must_use]
    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }

    /// Registers the instance under a runtime-wide name.
    ///
    /// If the name is already registered, creation returns the registered
    /// address and every other option is ignored.
    #[must_use]
    pub fn with_global_name(mut self, global_name: impl Into<String>) -> Self {
        self.global_name = Some(global_name.into());
        self
    }

    /// Requires that the given source reference is loaded in the runtime.
    #[must_use]
    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }

    #[inline]
    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub(crate) const fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    #[inline]
    pub(crate) fn global_name(&self) -> Option<&str> {
        self.global_name.as_deref()
    }

    #[inline]
    pub(crate) fn source_ref(&self) -> Option<&str> {
        self.source_ref.as_deref()
    }
}
