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

//! Addressing, envelopes and the messages the runtime itself speaks.
//!
//! *   [`Address`]: the opaque identity of an actor.
//! *   [`Envelope`] / [`OutboundEnvelope`]: a message in transit and a prepared send.
//! *   [`MessageContext`]: the typed view a handler receives.
//! *   [`MessageHierarchy`]: the explicit base-type table used by dispatch.
//! *   Lifecycle messages: [`ExitRequest`], [`ChildActorExited`], [`Wakeup`],
//!     [`PoisonMessage`], [`DeadEnvelope`].
//! *   Errors: [`MessageError`] for sends, [`CreateError`] for placement.

pub use address::Address;
pub use envelope::Envelope;
pub use hierarchy::MessageHierarchy;
pub use message_context::MessageContext;
pub use message_error::{CreateError, MessageError};
pub use outbound_envelope::OutboundEnvelope;
pub use signal::{
    ChildActorExited, DeadEnvelope, ExitRequest, PoisonMessage, TerminationReason, Wakeup,
};

pub(crate) use signal::is_lifecycle_message;

/// Defines [`Address`].
mod address;
/// Defines [`Envelope`].
mod envelope;
/// Defines [`MessageHierarchy`].
mod hierarchy;
/// Defines [`MessageContext`].
mod message_context;
/// Defines [`MessageError`] and [`CreateError`].
mod message_error;
/// Defines [`OutboundEnvelope`].
mod outbound_envelope;
/// Defines the runtime lifecycle messages.
mod signal;
