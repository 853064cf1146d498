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

//! Messages the runtime itself sends and understands.
//!
//! None of these is ever a dispatch fault: an actor without a handler for one of
//! them simply accepts it.

use std::time::Duration;

use crate::actor::{TroupeControl, TroupeStatus, TroupeWorkRejected, TroupeWorkerReady};
use crate::message::Address;
use crate::traits::ActorMessage;

/// Asks an actor to exit.
///
/// The actor finishes the message it is processing, runs its own handler for
/// the request (if any), then terminates. With `recursive` set (the default)
/// the runtime then sends an equivalent request to every live child and waits
/// for them before reporting termination to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitRequest {
    /// Whether children are asked to exit too.
    pub recursive: bool,
}

impl Default for ExitRequest {
    fn default() -> Self {
        Self { recursive: true }
    }
}

impl ExitRequest {
    /// An exit request that leaves children running.
    #[must_use]
    pub const fn non_recursive() -> Self {
        Self { recursive: false }
    }
}

/// Why an actor terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// It processed an [`ExitRequest`].
    Normal,
    /// A message arrived that nothing could handle. Carries the message type name.
    Unhandled(String),
    /// The runtime was force-cancelled.
    Cancelled,
    /// Its inbox closed underneath it.
    InboxClosed,
}

/// Delivered to a parent whenever one of its direct children terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildActorExited {
    /// The child that terminated.
    pub child: Address,
    /// Why it terminated.
    pub reason: TerminationReason,
}

/// Delivered to an actor when a timer it armed with
/// [`ManagedActor::wakeup_after`](crate::actor::ManagedActor::wakeup_after) fires.
#[derive(Debug, Clone)]
pub struct Wakeup {
    /// The delay the timer was armed with.
    pub delay: Duration,
    /// The payload given when arming.
    pub payload: Box<dyn ActorMessage>,
}

impl Wakeup {
    /// Borrows the payload as `T` if that is its type.
    #[must_use]
    pub fn payload<T: ActorMessage>(&self) -> Option<&T> {
        (*self.payload).as_any().downcast_ref::<T>()
    }
}

/// A message returned to its sender because the recipient could not process it.
#[derive(Debug, Clone)]
pub struct PoisonMessage {
    /// The original message.
    pub message: Box<dyn ActorMessage>,
    /// The actor that failed to process it.
    pub intended: Address,
    /// A short description of the failure.
    pub reason: String,
}

impl PoisonMessage {
    /// Borrows the original message as `T` if that is its type.
    #[must_use]
    pub fn message<T: ActorMessage>(&self) -> Option<&T> {
        (*self.message).as_any().downcast_ref::<T>()
    }
}

/// A message that could not be delivered because its recipient no longer exists.
#[derive(Debug, Clone)]
pub struct DeadEnvelope {
    /// The recipient that had already exited.
    pub intended: Address,
    /// The original sender.
    pub sender: Address,
    /// The original message.
    pub message: Box<dyn ActorMessage>,
}

/// Whether `message` is one of the runtime's own lifecycle messages.
pub(crate) fn is_lifecycle_message(message: &dyn ActorMessage) -> bool {
    let any = message.as_any();
    any.is::<ExitRequest>()
        || any.is::<ChildActorExited>()
        || any.is::<Wakeup>()
        || any.is::<PoisonMessage>()
        || any.is::<DeadEnvelope>()
        || any.is::<TroupeControl>()
        || any.is::<TroupeStatus>()
        || any.is::<TroupeWorkerReady>()
        || any.is::<TroupeWorkRejected>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Application;

    #[test]
    fn exit_requests_recurse_by_default() {
        assert!(ExitRequest::default().recursive);
        assert!(!ExitRequest::non_recursive().recursive);
    }

    #[test]
    fn lifecycle_messages_are_recognised() {
        assert!(is_lifecycle_message(&ExitRequest::default()));
        assert!(is_lifecycle_message(&Wakeup {
            delay: Duration::ZERO,
            payload: Box::new(Application),
        }));
        assert!(is_lifecycle_message(&TroupeControl::Status));
        assert!(!is_lifecycle_message(&Application));
    }

    #[test]
    fn wakeup_payload_downcasts() {
        let wakeup = Wakeup {
            delay: Duration::from_millis(5),
            payload: Box::new(Application),
        };
        assert!(wakeup.payload::<Application>().is_some());
        assert!(wakeup.payload::<ExitRequest>().is_none());
    }
}
