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

use std::fmt::Debug;

use async_trait::async_trait;

use crate::actor::ManagedActor;
use crate::message::Envelope;

/// Outcome of handing one envelope to a [`Behavior`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Some handler (or a fallback, or an overlay) accepted the message.
    Handled,
    /// No handler matched and no fallback was registered.
    Unhandled,
}

/// The receive interface implemented by the dispatcher and by every overlay
/// stacked in front of it.
///
/// An actor instance owns exactly one behavior chain, built from its
/// [`ActorType`](crate::actor::ActorType) when the instance is created. Overlays
/// hold the inner behavior and decide, per envelope, whether to consume it,
/// transform it, or pass it on:
///
/// ```text
/// Transient ─▶ TroupeManager ─▶ Dispatcher      (pool manager)
/// TroupeWorker ─▶ Dispatcher                    (pool worker)
/// Transient ─▶ Dispatcher                       (plain actor)
/// ```
#[async_trait]
pub trait Behavior<State>: Send
where
    State: Default + Send + Debug + 'static,
{
    /// Processes one envelope on behalf of `actor`.
    async fn receive(&mut self, actor: &mut ManagedActor<State>, envelope: Envelope) -> Delivery;

    /// Called when the runtime gives up on `envelope` after its handler panicked
    /// on every attempt. Overlays that track per-message bookkeeping release it here.
    fn abandoned(&mut self, _actor: &mut ManagedActor<State>, _envelope: &Envelope) {}
}
