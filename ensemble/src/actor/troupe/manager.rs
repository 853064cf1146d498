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

use crate::actor::troupe::pool::{Assignment, PendingWork, ReadyOutcome, TroupePool};
use crate::actor::troupe::{
    GraceExpired, TroupeControl, TroupeSettings, TroupeWorkRejected, TroupeWorkerReady,
};
use crate::actor::ManagedActor;
use crate::message::{is_lifecycle_message, ChildActorExited, Envelope, ExitRequest, Wakeup};
use crate::traits::{Behavior, Delivery};

/// Overlay installed on the instance that fronts a troupe.
///
/// Application messages never reach the manager's own handlers: they become
/// work for the pool. Lifecycle messages that are not about the pool pass
/// through to the inner behavior.
pub(crate) struct TroupeManager<State: Default + Send + Debug + 'static> {
    pool: TroupePool,
    inner: Box<dyn Behavior<State>>,
}

impl<State: Default + Send + Debug + 'static> TroupeManager<State> {
    pub(crate) fn new(settings: TroupeSettings, inner: Box<dyn Behavior<State>>) -> Self {
        Self {
            pool: TroupePool::new(settings),
            inner,
        }
    }

    fn hand_out(actor: &ManagedActor<State>, assignments: impl IntoIterator<Item = Assignment>) {
        for Assignment { worker, work } in assignments {
            trace!("Work {} -> {}", work.id, worker);
            if let Err(e) = actor.send(&worker, work) {
                warn!("Failed to hand work to {}: {}", worker, e);
            }
        }
    }

    fn arm_grace(&self, actor: &ManagedActor<State>) {
        let grace = self.pool.settings().grace_period;
        trace!("Arming troupe grace period of {:?}", grace);
        actor.wakeup_after(grace, GraceExpired);
    }

    fn control(&mut self, actor: &mut ManagedActor<State>, control: TroupeControl, envelope: &Envelope) {
        let arm = match control {
            TroupeControl::Status => false,
            TroupeControl::SetMaxCount(max_count) => {
                let arm = self.pool.set_max_count(max_count);
                let started = self.pool.fill(|| actor.spawn_worker());
                Self::hand_out(actor, started);
                arm
            }
            TroupeControl::SetIdleCount(idle_count) => self.pool.set_idle_count(idle_count),
        };
        if arm {
            self.arm_grace(actor);
        }
        let status = self.pool.status();
        debug!("Troupe {} status: {:?}", actor.address(), status);
        if let Err(e) = actor.send(envelope.sender(), status) {
            warn!("Failed to report troupe status to {}: {}", envelope.sender(), e);
        }
    }

    fn worker_ready(&mut self, actor: &ManagedActor<State>, ready: TroupeWorkerReady, envelope: &Envelope) {
        match self.pool.worker_ready(envelope.sender(), ready.completed) {
            ReadyOutcome::Assign(assignment) => Self::hand_out(actor, [assignment]),
            ReadyOutcome::ArmGrace => self.arm_grace(actor),
            ReadyOutcome::Parked => {}
            ReadyOutcome::Ignored => {
                trace!("Ignoring readiness from {}", envelope.sender());
            }
        }
    }

    fn grace_expired(&mut self, actor: &ManagedActor<State>) {
        for worker in self.pool.grace_expired() {
            debug!("Dismissing surplus worker {}", worker);
            if let Err(e) = actor.send(&worker, ExitRequest::default()) {
                warn!("Failed to dismiss {}: {}", worker, e);
            }
        }
    }

    fn worker_exited(&mut self, actor: &mut ManagedActor<State>, exited: &ChildActorExited) {
        debug!("Worker {} exited ({:?})", exited.child, exited.reason);
        let reassigned = self
            .pool
            .worker_exited(&exited.child, || actor.spawn_worker());
        Self::hand_out(actor, reassigned);
    }
}

#[async_trait]
impl<State: Default + Send + Debug + 'static> Behavior<State> for TroupeManager<State> {
    async fn receive(&mut self, actor: &mut ManagedActor<State>, envelope: Envelope) -> Delivery {
        if let Some(control) = envelope.downcast_ref::<TroupeControl>().copied() {
            self.control(actor, control, &envelope);
            return Delivery::Handled;
        }
        if let Some(ready) = envelope.downcast_ref::<TroupeWorkerReady>().copied() {
            self.worker_ready(actor, ready, &envelope);
            return Delivery::Handled;
        }
        if let Some(rejected) = envelope.downcast_ref::<TroupeWorkRejected>() {
            self.pool.work_rejected(envelope.sender(), rejected.id);
            return Delivery::Handled;
        }
        if envelope
            .downcast_ref::<Wakeup>()
            .is_some_and(|wakeup| wakeup.payload::<GraceExpired>().is_some())
        {
            self.grace_expired(actor);
            return Delivery::Handled;
        }
        if let Some(exited) = envelope.downcast_ref::<ChildActorExited>() {
            if self.pool.tracks(&exited.child) {
                self.worker_exited(actor, exited);
                return Delivery::Handled;
            }
        }
        if is_lifecycle_message(envelope.message()) {
            return self.inner.receive(actor, envelope).await;
        }

        let Envelope { message, sender, .. } = envelope;
        trace!("Troupe {} accepted {}", actor.address(), (*message).type_name());
        let assignment = self
            .pool
            .submit(PendingWork { message, sender }, || actor.spawn_worker());
        Self::hand_out(actor, assignment);
        Delivery::Handled
    }

    fn abandoned(&mut self, actor: &mut ManagedActor<State>, envelope: &Envelope) {
        self.inner.abandoned(actor, envelope);
    }
}
