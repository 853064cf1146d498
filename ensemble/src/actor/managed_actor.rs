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

use std::collections::HashSet;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::time::Duration;

use acton_ern::prelude::*;
use dashmap::mapref::entry::Entry;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, trace, warn};

use crate::actor::{ActorConfig, ActorType, Placement};
use crate::common::{ActorRuntime, Requirements};
use crate::message::{
    Address, CreateError, Envelope, ExitRequest, MessageError, OutboundEnvelope, Wakeup,
};
use crate::traits::ActorMessage;

/// Contains the message loop and termination sequence of a running instance.
mod started;

/// How an instance participates in its actor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// Created through `create_actor` or `create_child`. For a troupe type
    /// this is the manager.
    Standalone,
    /// Created by a troupe manager to serve its pool.
    TroupeWorker,
}

/// A live actor instance: the application state plus everything the runtime
/// keeps about it.
///
/// Handlers and lifecycle hooks receive `&mut ManagedActor<State>` and read or
/// mutate [`model`](Self::model) directly. All access happens on the
/// instance's own task, one message at a time.
pub struct ManagedActor<State: Default + Send + Debug + 'static> {
    /// The application state. Starts as `State::default()`.
    pub model: State,

    pub(crate) address: Address,
    pub(crate) parent: Option<Address>,
    pub(crate) runtime: ActorRuntime,
    pub(crate) actor_type: ActorType<State>,
    /// Requirements this instance was placed with; workers inherit them.
    pub(crate) requirements: Requirements,
    pub(crate) children: HashSet<Address>,
    pub(crate) work_in_progress: bool,
    pub(crate) cancellation_token: CancellationToken,
}

impl<State: Default + Send + Debug + 'static> ManagedActor<State> {
    /// This instance's address.
    #[inline]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// This instance's hierarchical identifier.
    #[inline]
    pub const fn id(&self) -> &Ern {
        self.address.id()
    }

    /// The root segment of the identifier.
    #[inline]
    pub fn name(&self) -> &str {
        self.address.name()
    }

    /// The creating actor, or `None` for top-level actors.
    #[inline]
    pub const fn parent(&self) -> Option<&Address> {
        self.parent.as_ref()
    }

    /// The runtime hosting this instance.
    #[inline]
    pub const fn runtime(&self) -> &ActorRuntime {
        &self.runtime
    }

    /// The actor type this instance was created from.
    #[inline]
    pub const fn actor_type(&self) -> &ActorType<State> {
        &self.actor_type
    }

    /// Live children. A child leaves this set when its
    /// [`ChildActorExited`](crate::message::ChildActorExited) arrives.
    #[inline]
    pub const fn children(&self) -> &HashSet<Address> {
        &self.children
    }

    /// Sends `message` from this instance to `recipient`.
    ///
    /// # Errors
    ///
    /// Addressing faults only; see [`MessageError`].
    pub fn send(&self, recipient: &Address, message: impl ActorMessage) -> Result<(), MessageError> {
        self.runtime
            .deliver(Envelope::new(message, self.address.clone(), recipient.clone()))
    }

    /// A reusable send from this instance to `recipient`.
    #[must_use]
    pub fn envelope_to(&self, recipient: &Address) -> OutboundEnvelope {
        OutboundEnvelope::new(
            self.address.clone(),
            recipient.clone(),
            self.runtime.clone(),
        )
    }

    /// Creates a child of this instance.
    ///
    /// The child appears in [`children`](Self::children) immediately. When a
    /// global name short-circuits to an existing actor, that actor is returned
    /// and does not become a child.
    ///
    /// # Errors
    ///
    /// See [`ActorRuntime::create_actor`].
    pub fn create_child<C: Default + Send + Debug + 'static>(
        &mut self,
        actor_type: &ActorType<C>,
        config: ActorConfig,
    ) -> Result<Address, CreateError> {
        let (address, created) = spawn_actor(
            &self.runtime,
            actor_type,
            config,
            Some(&self.address),
            Role::Standalone,
        )?;
        if created {
            self.children.insert(address.clone());
        }
        Ok(address)
    }

    /// Asks this instance to exit once the current message has been processed.
    /// Children are asked to exit too.
    pub fn request_exit(&self) {
        trace!("{} requested its own exit", self.address);
        if let Err(e) = self.send(&self.address, ExitRequest::default()) {
            warn!("Failed to request exit for {}: {}", self.address, e);
        }
    }

    /// Arms a timer. After `delay`, this instance receives a [`Wakeup`]
    /// carrying `payload`. Timers still pending when the instance terminates
    /// never fire.
    pub fn wakeup_after(&self, delay: Duration, payload: impl ActorMessage) {
        let runtime = self.runtime.clone();
        let address = self.address.clone();
        let token = self.cancellation_token.clone();
        let payload: Box<dyn ActorMessage> = Box::new(payload);
        self.runtime.0.timers.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    trace!("Timer for {} cancelled", address);
                }
                () = tokio::time::sleep(delay) => {
                    let wakeup = Wakeup { delay, payload };
                    if let Err(e) = runtime.deliver(Envelope::new(wakeup, address.clone(), address.clone())) {
                        warn!("Failed to deliver wakeup to {}: {}", address, e);
                    }
                }
            }
        });
    }

    /// Marks whether this instance is in the middle of a multi-step work item.
    ///
    /// Only meaningful for troupe workers: while the flag is set the worker
    /// does not report itself ready, so its manager gives it no further work.
    /// The flag is cleared whenever a new work item arrives.
    pub fn set_work_in_progress(&mut self, in_progress: bool) {
        self.work_in_progress = in_progress;
    }

    /// See [`set_work_in_progress`](Self::set_work_in_progress).
    #[inline]
    pub const fn work_in_progress(&self) -> bool {
        self.work_in_progress
    }

    /// Starts one more worker for this troupe manager.
    pub(crate) fn spawn_worker(&mut self) -> Option<Address> {
        let config = ActorConfig::new_with_name(format!("{}-worker", self.actor_type.name()))
            .with_requirements(self.requirements.clone());
        match spawn_actor(
            &self.runtime,
            &self.actor_type,
            config,
            Some(&self.address),
            Role::TroupeWorker,
        ) {
            Ok((worker, _)) => {
                trace!("{} started worker {}", self.address, worker);
                self.children.insert(worker.clone());
                Some(worker)
            }
            Err(e) => {
                error!("{} could not start a worker: {}", self.address, e);
                None
            }
        }
    }
}

impl<State: Default + Send + Debug + 'static> Debug for ManagedActor<State> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedActor")
            .field("address", &self.address)
            .field("parent", &self.parent)
            .field("actor_type", &self.actor_type.name())
            .field("model", &self.model)
            .field("children", &self.children.len())
            .field("work_in_progress", &self.work_in_progress)
            .finish_non_exhaustive()
    }
}

/// Creates an instance and starts its task.
///
/// Returns the address and whether a new instance was created (`false` when a
/// global name resolved to an existing actor).
pub(crate) fn spawn_actor<State: Default + Send + Debug + 'static>(
    runtime: &ActorRuntime,
    actor_type: &ActorType<State>,
    config: ActorConfig,
    parent: Option<&Address>,
    role: Role,
) -> Result<(Address, bool), CreateError> {
    if let Some(global_name) = config.global_name() {
        if let Some(existing) = runtime.lookup_global(global_name) {
            debug!("Global name {global_name} already registered to {existing}");
            return Ok((existing, false));
        }
    }

    if let Some(source_ref) = config.source_ref() {
        if !runtime.has_source(source_ref) {
            return Err(CreateError::InvalidSourceRef(source_ref.to_string()));
        }
    }

    Placement::place(
        std::iter::once(runtime),
        actor_type.gate(),
        config.requirements(),
        actor_type.name(),
    )?;

    let segment = config
        .name()
        .filter(|name| !name.is_empty())
        .or_else(|| Some(actor_type.name()).filter(|name| !name.is_empty()))
        .map_or_else(|| runtime.config().defaults.actor_name.clone(), str::to_string);
    let root = Ern::with_root(segment.clone())
        .map_err(|e| CreateError::InvalidName(format!("{segment}: {e:?}")))?;
    let id = match parent {
        Some(parent) => parent.id().clone() + root,
        None => root,
    };

    let (outbox, inbox) = mpsc::unbounded_channel();
    let address = runtime.issue_address(id, outbox);

    if let Some(global_name) = config.global_name() {
        match runtime.0.globals.entry(global_name.to_string()) {
            Entry::Occupied(existing) => return Ok((existing.get().clone(), false)),
            Entry::Vacant(slot) => {
                slot.insert(address.clone());
            }
        }
    }

    let actor = ManagedActor {
        model: State::default(),
        address: address.clone(),
        parent: parent.cloned(),
        runtime: runtime.clone(),
        actor_type: actor_type.clone(),
        requirements: config.requirements().clone(),
        children: HashSet::new(),
        work_in_progress: false,
        cancellation_token: runtime.0.cancellation_token.child_token(),
    };
    let behavior = actor_type.behavior(role);

    let tracker = TaskTracker::new();
    runtime.register(address.clone(), tracker.clone(), parent.cloned());
    tracker.spawn(actor.run(behavior, inbox));
    tracker.close();

    debug!("Created {} ({:?}) as {}", actor_type.name(), role, address);
    Ok((address, true))
}
