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

//! Type aliases shared across the crate: handler futures, erased handler
//! signatures and capability predicates.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::actor::ManagedActor;
use crate::common::{Capabilities, Handled, Requirements};
use crate::message::Envelope;
use crate::traits::ActorMessage;

/// The future every message handler and lifecycle hook returns.
///
/// Build it with [`Reply`](crate::common::Reply).
pub type HandlerFuture = Pin<Box<dyn Future<Output = Handled> + Send + 'static>>;

/// A handler after its message type has been erased.
///
/// Receives the message at the type level the handler was registered for and
/// the original envelope (for the sender). Returns `None` when the payload is
/// not of the registered type.
pub(crate) type ErasedHandler<State> = Arc<
    dyn for<'a> Fn(&'a mut ManagedActor<State>, &'a dyn ActorMessage, &'a Envelope) -> Option<HandlerFuture>
        + Send
        + Sync
        + 'static,
>;

/// The catch-all handler run when no typed handler matches.
pub(crate) type FallbackHandler<State> = Arc<
    dyn for<'a> Fn(&'a mut ManagedActor<State>, &'a Envelope) -> HandlerFuture
        + Send
        + Sync
        + 'static,
>;

/// `after_start`, `before_stop` and `after_stop` hooks. The [`Handled`] value
/// they resolve to is ignored.
pub(crate) type LifecycleHook<State> = Arc<
    dyn for<'a> Fn(&'a mut ManagedActor<State>) -> HandlerFuture + Send + Sync + 'static,
>;

/// A capability predicate evaluated against a candidate host at placement time.
pub type CapabilityCheck = Arc<dyn Fn(&Capabilities, &Requirements) -> bool + Send + Sync>;
