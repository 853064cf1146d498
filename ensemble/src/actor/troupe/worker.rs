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
use tracing::{debug, trace, warn};

use crate::actor::troupe::{TroupeWork, TroupeWorkRejected, TroupeWorkerReady};
use crate::actor::ManagedActor;
use crate::message::{Envelope, ExitRequest, PoisonMessage};
use crate::traits::{ActorMessage, Behavior, Delivery};

/// Overlay installed on every troupe worker.
///
/// Unwraps work from the manager so the actor's handlers see the original
/// message and the original sender, and reports readiness once the actor has
/// no work in progress.
pub(crate) struct TroupeWorker<State: Default + Send + Debug + 'static> {
    inner: Box<dyn Behavior<State>>,
    current: Option<TroupeWork>,
}

impl<State: Default + Send + Debug + 'static> TroupeWorker<State> {
    pub(crate) const fn new(inner: Box<dyn Behavior<State>>) -> Self {
        Self {
            inner,
            current: None,
        }
    }

    /// The work item carried by `envelope`, if it came from the manager.
    fn work_in(actor: &ManagedActor<State>, envelope: &Envelope) -> Option<TroupeWork> {
        if actor.parent() != Some(envelope.sender()) {
            return None;
        }
        envelope.downcast_ref::<TroupeWork>().cloned()
    }

    fn notify_manager(actor: &ManagedActor<State>, report: impl ActorMessage) {
        let Some(manager) = actor.parent() else {
            return;
        };
        if let Err(e) = actor.send(manager, report) {
            warn!("Failed to report to troupe manager {}: {}", manager, e);
        }
    }

    fn report_ready(&mut self, actor: &ManagedActor<State>) {
        if actor.work_in_progress() {
            return;
        }
        let Some(completed) = self.current.take() else {
            return;
        };
        trace!("Worker {} finished work {}", actor.address(), completed.id);
        Self::notify_manager(
            actor,
            TroupeWorkerReady {
                completed: Some(completed.id),
            },
        );
    }

    /// The current item had no handler. The actor returns it to its sender
    /// and exits; the manager must not requeue it.
    fn reject_current(&mut self, actor: &ManagedActor<State>) {
        let Some(rejected) = self.current.take() else {
            return;
        };
        Self::notify_manager(actor, TroupeWorkRejected { id: rejected.id });
    }
}

#[async_trait]
impl<State: Default + Send + Debug + 'static> Behavior<State> for TroupeWorker<State> {
    async fn receive(&mut self, actor: &mut ManagedActor<State>, envelope: Envelope) -> Delivery {
        if envelope.is::<ExitRequest>() {
            return self.inner.receive(actor, envelope).await;
        }

        let Some(work) = Self::work_in(actor, &envelope) else {
            let delivery = self.inner.receive(actor, envelope).await;
            if delivery == Delivery::Handled {
                self.report_ready(actor);
            }
            return delivery;
        };

        let unwrapped = Envelope::from_boxed(
            work.message.clone(),
            work.sender.clone(),
            actor.address().clone(),
        );
        self.current = Some(work);
        actor.set_work_in_progress(false);
        match self.inner.receive(actor, unwrapped).await {
            Delivery::Handled => {
                self.report_ready(actor);
                Delivery::Handled
            }
            Delivery::Unhandled => {
                self.reject_current(actor);
                Delivery::Unhandled
            }
        }
    }

    fn abandoned(&mut self, actor: &mut ManagedActor<State>, envelope: &Envelope) {
        self.inner.abandoned(actor, envelope);
        let Some(current) = self.current.as_ref() else {
            return;
        };
        let was_current = Self::work_in(actor, envelope).is_some_and(|work| work.id == current.id);
        if !was_current && actor.work_in_progress() {
            // A later step of the current item panicked. Its progress is lost,
            // so the item goes back to its sender like any failed message.
            debug!(
                "Worker {} abandons work {} after a failed step",
                actor.address(),
                current.id
            );
            let poison = PoisonMessage {
                message: current.message.clone(),
                intended: actor.address().clone(),
                reason: "handler panicked during multi-step work".to_string(),
            };
            if let Err(e) = actor.send(&current.sender, poison) {
                trace!("Poison for {} not deliverable: {}", current.sender, e);
            }
        }
        actor.set_work_in_progress(false);
        self.report_ready(actor);
    }
}
