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

use static_assertions::assert_impl_all;

use crate::message::{Address, MessageError, OutboundEnvelope};
use crate::traits::ActorMessage;

/// What a typed handler sees of the message it was invoked for.
///
/// `message()` is the payload at the type level the handler was registered
/// for: when a message reached this handler through its base type, the payload
/// has already been converted.
#[derive(Clone, Debug)]
pub struct MessageContext<M> {
    pub(crate) message: M,
    pub(crate) reply_envelope: OutboundEnvelope,
}

impl<M> MessageContext<M> {
    /// The message payload.
    #[inline]
    pub const fn message(&self) -> &M {
        &self.message
    }

    /// The address that sent the message.
    #[inline]
    pub const fn sender(&self) -> &Address {
        self.reply_envelope.recipient()
    }

    /// An envelope addressed back to the sender, with this actor as the sender.
    ///
    /// Clone it into a [`Reply::pending`](crate::common::Reply::pending) future
    /// to answer after asynchronous work.
    #[inline]
    pub fn reply_envelope(&self) -> OutboundEnvelope {
        self.reply_envelope.clone()
    }

    /// Sends `message` back to whoever sent this one.
    ///
    /// # Errors
    ///
    /// Returns a [`MessageError`] if the sender's address cannot be used from
    /// this runtime.
    pub fn reply(&self, message: impl ActorMessage) -> Result<(), MessageError> {
        self.reply_envelope.send(message)
    }
}

assert_impl_all!(MessageContext<u32>: Send, Sync);
