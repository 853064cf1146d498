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
use tracing::trace;

use crate::actor::{ActorType, ManagedActor};
use crate::common::Handled;
use crate::message::{is_lifecycle_message, Envelope};
use crate::traits::{ActorMessage, Behavior, Delivery};

/// Routes a message to the most specific handler registered for it.
///
/// For each message type level, starting at the message's exact type and
/// moving up through its linked base types, the actor's handler layers are
/// walked from most derived to base. The first handler found runs; if it
/// returns [`Handled::Defer`] the walk continues with the next layer at the
/// same message level, and after the last layer with the next message level.
pub(crate) struct Dispatcher<State: Default + Send + Debug + 'static> {
    actor_type: ActorType<State>,
}

impl<State: Default + Send + Debug + 'static> Dispatcher<State> {
    pub(crate) const fn new(actor_type: ActorType<State>) -> Self {
        Self { actor_type }
    }
}

#[async_trait]
impl<State: Default + Send + Debug + 'static> Behavior<State> for Dispatcher<State> {
    async fn receive(&mut self, actor: &mut ManagedActor<State>, envelope: Envelope) -> Delivery {
        let mut upcast: Option<Box<dyn ActorMessage>> = None;
        let mut invoked = false;

        loop {
            let level: &dyn ActorMessage = match &upcast {
                Some(message) => &**message,
                None => envelope.message(),
            };
            let type_id = level.as_any().type_id();

            for layer in self.actor_type.layers() {
                let Some(handler) = layer.handler(type_id) else {
                    continue;
                };
                let Some(future) = handler(actor, level, &envelope) else {
                    continue;
                };
                invoked = true;
                if future.await == Handled::Done {
                    return Delivery::Handled;
                }
                trace!(
                    "{} deferred {}; continuing",
                    layer.type_name,
                    level.type_name()
                );
            }

            match actor.runtime().upcast(level) {
                Some(base) => upcast = Some(base),
                None => break,
            }
        }

        if invoked || is_lifecycle_message(envelope.message()) {
            return Delivery::Handled;
        }

        if let Some(fallback) = self.actor_type.fallback() {
            trace!(
                "No handler for {} on {}; running fallback",
                envelope.message().type_name(),
                self.actor_type.name()
            );
            fallback(actor, &envelope).await;
            return Delivery::Handled;
        }

        Delivery::Unhandled
    }
}
