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

use tracing::{instrument, trace};

use crate::common::ActorRuntime;
use crate::message::{Address, Envelope, MessageError};
use crate::traits::ActorMessage;

/// A prepared send: a fixed sender and recipient bound to the runtime that
/// will validate and route the message.
///
/// Sending never blocks. It fails only for addressing faults; a recipient
/// that has exited is not an error.
#[derive(Debug, Clone)]
pub struct OutboundEnvelope {
    pub(crate) sender: Address,
    pub(crate) recipient: Address,
    pub(crate) runtime: ActorRuntime,
}

impl OutboundEnvelope {
    pub(crate) const fn new(sender: Address, recipient: Address, runtime: ActorRuntime) -> Self {
        Self {
            sender,
            recipient,
            runtime,
        }
    }

    /// The address replies to this send will go to.
    #[inline]
    #[must_use]
    pub const fn sender(&self) -> &Address {
        &self.sender
    }

    /// The address this envelope delivers to.
    #[inline]
    #[must_use]
    pub const fn recipient(&self) -> &Address {
        &self.recipient
    }

    /// Sends `message` to the recipient.
    ///
    /// # Errors
    ///
    /// Returns a [`MessageError`] if the recipient address is malformed or
    /// belongs to another runtime.
    #[instrument(skip(self, message), fields(message_type = std::any::type_name_of_val(&message)))]
    pub fn send(&self, message: impl ActorMessage) -> Result<(), MessageError> {
        trace!(sender = %self.sender, recipient = %self.recipient, "Sending message");
        self.runtime.deliver(Envelope::new(
            message,
            self.sender.clone(),
            self.recipient.clone(),
        ))
    }
}
