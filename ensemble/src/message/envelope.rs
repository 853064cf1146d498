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

use crate::actor::TroupeWork;
use crate::message::Address;
use crate::traits::ActorMessage;

/// A message in transit: the payload plus its sender and recipient.
///
/// Envelopes are what actor inboxes carry. Handlers usually see the typed
/// [`MessageContext`](crate::message::MessageContext) instead; envelopes surface
/// directly as `ask` replies and inside dead-letter reports.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub(crate) message: Box<dyn ActorMessage>,
    pub(crate) sender: Address,
    pub(crate) recipient: Address,
}

impl Envelope {
    pub(crate) fn new(message: impl ActorMessage, sender: Address, recipient: Address) -> Self {
        Self::from_boxed(Box::new(message), sender, recipient)
    }

    pub(crate) fn from_boxed(
        message: Box<dyn ActorMessage>,
        sender: Address,
        recipient: Address,
    ) -> Self {
        Self {
            message,
            sender,
            recipient,
        }
    }

    /// The payload as a trait object.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &dyn ActorMessage {
        &*self.message
    }

    /// The address the message was sent from.
    #[inline]
    #[must_use]
    pub const fn sender(&self) -> &Address {
        &self.sender
    }

    /// The address the message was sent to.
    #[inline]
    #[must_use]
    pub const fn recipient(&self) -> &Address {
        &self.recipient
    }

    /// Borrows the payload as `T` if that is its concrete type.
    #[must_use]
    pub fn downcast_ref<T: ActorMessage>(&self) -> Option<&T> {
        self.message().as_any().downcast_ref::<T>()
    }

    /// Whether the payload is a `T`.
    #[must_use]
    pub fn is<T: ActorMessage>(&self) -> bool {
        self.message().as_any().is::<T>()
    }

    /// Consumes the envelope, returning the payload as `T` if that is its type.
    #[must_use]
    pub fn into_message<T: ActorMessage + Clone>(self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// The message and sender a poison report should carry.
    ///
    /// Work dispatched through a troupe is reported under the caller that
    /// submitted it, not under the manager that forwarded it.
    pub(crate) fn poison_parts(&self) -> (Box<dyn ActorMessage>, Address) {
        match self.downcast_ref::<TroupeWork>() {
            Some(work) => (work.message.clone(), work.sender.clone()),
            None => (self.message.clone(), self.sender.clone()),
        }
    }
}
