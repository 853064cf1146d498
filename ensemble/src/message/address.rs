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

use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

use acton_ern::Ern;
use tokio::sync::mpsc::UnboundedSender;

use crate::message::Envelope;

/// The opaque, runtime-issued name of an actor.
///
/// An `Address` is the only way to name a message recipient. Equality and
/// hashing are defined over the issuing runtime and a per-runtime serial
/// number, never over the display name or the delivery channel, so an address
/// stays a stable map key after the actor it names has exited.
///
/// `Address::default()` is an *unissued* address: sending to it fails with
/// [`MessageError::MalformedAddress`](crate::message::MessageError::MalformedAddress).
#[derive(Clone, Default)]
pub struct Address {
    pub(crate) id: Ern,
    pub(crate) serial: u64,
    pub(crate) system: u64,
    pub(crate) outbox: Option<UnboundedSender<Envelope>>,
}

impl Address {
    pub(crate) const fn new(
        id: Ern,
        serial: u64,
        system: u64,
        outbox: Option<UnboundedSender<Envelope>>,
    ) -> Self {
        Self {
            id,
            serial,
            system,
            outbox,
        }
    }

    /// The hierarchical display name of the actor.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &Ern {
        &self.id
    }

    /// The root segment of the display name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.root.as_str()
    }

    /// The id of the runtime that issued this address.
    #[inline]
    #[must_use]
    pub const fn system_id(&self) -> u64 {
        self.system
    }

    /// Whether this address was issued by a runtime.
    #[inline]
    #[must_use]
    pub const fn is_issued(&self) -> bool {
        self.serial != 0 && self.outbox.is_some()
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.system == other.system && self.serial == other.serial
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.system.hash(state);
        self.serial.hash(state);
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Address")
            .field("id", &self.id.to_string())
            .field("system", &self.system)
            .field("serial", &self.serial)
            .finish_non_exhaustive()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.id, self.serial)
    }
}
