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
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::actor::ManagedActor;
use crate::message::{is_lifecycle_message, Envelope, Wakeup};
use crate::traits::{Behavior, Delivery};

/// When a transient actor exits on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientPolicy {
    /// Exit a fixed delay after the first message, however much traffic follows.
    FixedDelay(Duration),
    /// Exit once a full delay passes without an application message.
    /// Runtime lifecycle messages do not count as traffic.
    IdleDelay(Duration),
}

/// Timer payload; `generation` identifies the deadline it was armed for.
#[derive(Debug, Clone, Copy)]
struct TransientDeadline {
    generation: u64,
}

/// Overlay that arms the self-exit timer and turns its expiry into an exit request.
pub(crate) struct Transient<State: Default + Send + Debug + 'static> {
    policy: TransientPolicy,
    inner: Box<dyn Behavior<State>>,
    generation: u64,
    armed: bool,
}

impl<State: Default + Send + Debug + 'static> Transient<State> {
    pub(crate) fn new(policy: TransientPolicy, inner: Box<dyn Behavior<State>>) -> Self {
        Self {
            policy,
            inner,
            generation: 0,
            armed: false,
        }
    }

    fn arm(&mut self, actor: &ManagedActor<State>, envelope: &Envelope) {
        match self.policy {
            TransientPolicy::FixedDelay(delay) => {
                if !self.armed {
                    self.armed = true;
                    actor.wakeup_after(delay, TransientDeadline { generation: 0 });
                }
            }
            TransientPolicy::IdleDelay(delay) => {
                if !is_lifecycle_message(envelope.message()) {
                    self.generation += 1;
                    self.armed = true;
                    actor.wakeup_after(
                        delay,
                        TransientDeadline {
                            generation: self.generation,
                        },
                    );
                }
            }
        }
    }
}

#[async_trait]
impl<State: Default + Send + Debug + 'static> Behavior<State> for Transient<State> {
    async fn receive(&mut self, actor: &mut ManagedActor<State>, envelope: Envelope) -> Delivery {
        let deadline = envelope
            .downcast_ref::<Wakeup>()
            .and_then(|wakeup| wakeup.payload::<TransientDeadline>().copied());
        if let Some(deadline) = deadline {
            if deadline.generation == self.generation {
                debug!("Transient actor {} expired", actor.address());
                actor.request_exit();
            } else {
                trace!(
                    "Ignoring stale deadline {} (current {})",
                    deadline.generation,
                    self.generation
                );
            }
            return Delivery::Handled;
        }

        self.arm(actor, &envelope);
        self.inner.receive(actor, envelope).await
    }

    fn abandoned(&mut self, actor: &mut ManagedActor<State>, envelope: &Envelope) {
        self.inner.abandoned(actor, envelope);
    }
}

