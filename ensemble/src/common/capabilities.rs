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

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single capability (or requirement) value.
///
/// Deserializes from plain TOML values: `gpu = true`, `cores = 8`,
/// `memory_gb = 15.5`, `region = "eu-west"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    /// A flag.
    Bool(bool),
    /// An integer quantity.
    Int(i64),
    /// A fractional quantity.
    Float(f64),
    /// A label.
    Text(String),
}

impl CapabilityValue {
    /// Whether the value counts as "present": `true`, non-zero, or non-empty.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::Text(label) => !label.is_empty(),
        }
    }
}

impl fmt::Display for CapabilityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(label) => write!(f, "{label}"),
        }
    }
}

impl From<bool> for CapabilityValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for CapabilityValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for CapabilityValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for CapabilityValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for CapabilityValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CapabilityValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A named set of capability values.
///
/// A host exposes one as its capability map; an actor creation carries one as
/// its [`Requirements`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeMap<String, CapabilityValue>);

/// Per-creation requirements, matched against host [`Capabilities`].
pub type Requirements = Capabilities;

impl Capabilities {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Capabilities::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<CapabilityValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Inserts or replaces a value, returning the previous one.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<CapabilityValue>,
    ) -> Option<CapabilityValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Removes a value, returning it.
    pub fn remove(&mut self, name: &str) -> Option<CapabilityValue> {
        self.0.remove(name)
    }

    /// Looks up a value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CapabilityValue> {
        self.0.get(name)
    }

    /// Whether `name` is present with a truthy value.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(CapabilityValue::is_truthy)
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CapabilityValue)> {
        self.0.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        let caps = Capabilities::new()
            .with("gpu", true)
            .with("tpu", false)
            .with("cores", 0)
            .with("region", "");
        assert!(caps.has("gpu"));
        assert!(!caps.has("tpu"));
        assert!(!caps.has("cores"));
        assert!(!caps.has("region"));
        assert!(!caps.has("missing"));
    }

    #[test]
    fn deserializes_from_toml_table() {
        let caps: Capabilities = toml::from_str(
            r#"
            gpu = true
            cores = 8
            memory_gb = 15.5
            region = "eu-west"
            "#,
        )
        .unwrap();
        assert_eq!(caps.get("gpu"), Some(&CapabilityValue::Bool(true)));
        assert_eq!(caps.get("cores"), Some(&CapabilityValue::Int(8)));
        assert_eq!(caps.get("memory_gb"), Some(&CapabilityValue::Float(15.5)));
        assert_eq!(
            caps.get("region"),
            Some(&CapabilityValue::Text("eu-west".into()))
        );
        assert_eq!(caps.len(), 4);
    }
}
