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

use crate::message::Address;

/// Addressing faults, returned synchronously from a send call.
///
/// Sending to an actor that has exited is *not* an error; that message goes to
/// the dead-letter handler instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// The address was never issued by a runtime (for example `Address::default()`).
    MalformedAddress(String),
    /// The address was issued by a different runtime instance.
    ForeignAddress {
        /// The address that was used.
        address: Address,
        /// The system id of the runtime performing the send.
        expected_system: u64,
    },
}

impl std::fmt::Display for MessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedAddress(address) => write!(f, "Malformed address: {address}"),
            Self::ForeignAddress {
                address,
                expected_system,
            } => write!(
                f,
                "Address {address} belongs to system {} and cannot be used from system {expected_system}",
                address.system
            ),
        }
    }
}

impl std::error::Error for MessageError {}

/// Placement faults, returned synchronously from `create_actor`.
///
/// When creation fails no instance exists and nothing was spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// No candidate host satisfied the actor type's capability requirements.
    NoCompatibleHost {
        /// Name of the actor type that could not be placed.
        actor_type: String,
    },
    /// The requested source reference is not loaded in this runtime.
    InvalidSourceRef(String),
    /// The actor name could not be turned into an identifier.
    InvalidName(String),
}

impl std::fmt::Display for CreateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCompatibleHost { actor_type } => {
                write!(f, "No compatible host for actor type {actor_type}")
            }
            Self::InvalidSourceRef(source) => write!(f, "Unknown source reference: {source}"),
            Self::InvalidName(name) => write!(f, "Invalid actor name: {name}"),
        }
    }
}

impl std::error::Error for CreateError {}
