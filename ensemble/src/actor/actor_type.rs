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

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use std::sync::Arc;

use tracing::trace;

use crate::actor::dispatcher::Dispatcher;
use crate::actor::transient::Transient;
use crate::actor::troupe::{TroupeManager, TroupeWorker};
use crate::actor::{CapabilityGate, ManagedActor, Role, TransientPolicy, TroupeSettings};
use crate::common::{
    Capabilities, ErasedHandler, FallbackHandler, HandlerFuture, LifecycleHook, Requirements,
};
use crate::message::{Envelope, MessageContext, OutboundEnvelope};
use crate::traits::{ActorMessage, Behavior};

/// One level of an actor type's inheritance chain: the handlers that level
/// registered, keyed by message type.
pub(crate) struct HandlerLayer<State: Default + Send + Debug + 'static> {
    pub(crate) type_name: String,
    handlers: HashMap<TypeId, ErasedHandler<State>>,
}

impl<State: Default + Send + Debug + 'static> HandlerLayer<State> {
    fn new(type_name: String) -> Self {
        Self {
            type_name,
            handlers: HashMap::new(),
        }
    }

    #[inline]
    pub(crate) fn handler(&self, message_type: TypeId) -> Option<&ErasedHandler<State>> {
        self.handlers.get(&message_type)
    }
}

impl<State: Default + Send + Debug + 'static> Clone for HandlerLayer<State> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            handlers: self.handlers.clone(),
        }
    }
}

#[derive(Default)]
struct Hooks<State: Default + Send + Debug + 'static> {
    after_start: Option<LifecycleHook<State>>,
    before_stop: Option<LifecycleHook<State>>,
    after_stop: Option<LifecycleHook<State>>,
}

impl<State: Default + Send + Debug + 'static> Clone for Hooks<State> {
    fn clone(&self) -> Self {
        Self {
            after_start: self.after_start.clone(),
            before_stop: self.before_stop.clone(),
            after_stop: self.after_stop.clone(),
        }
    }
}

/// Builder for an actor type: its handler table, capability predicates and overlays.
///
/// Build a definition once at startup, then freeze it with
/// [`register`](Self::register) into an [`ActorType`] that every instance
/// shares by reference.
///
/// ```ignore
/// let mut base = ActorDefinition::<Shape>::new("shape");
/// base.on::<Draw>(|actor, _ctx| {
///     actor.model.draws += 1;
///     Reply::ready()
/// });
/// let base = base.register();
///
/// let mut circle = ActorDefinition::derive("circle", &base);
/// circle.on::<Draw>(|actor, _ctx| {
///     actor.model.circles += 1;
///     Reply::defer() // the base type's Draw handler runs next
/// });
/// let circle = circle.register();
/// ```
pub struct ActorDefinition<State: Default + Send + Debug + 'static> {
    own: HandlerLayer<State>,
    inherited: Vec<HandlerLayer<State>>,
    on_unhandled: Option<FallbackHandler<State>>,
    gate: CapabilityGate,
    transient: Option<TransientPolicy>,
    troupe: Option<TroupeSettings>,
    hooks: Hooks<State>,
}

impl<State: Default + Send + Debug + 'static> ActorDefinition<State> {
    /// Starts a new base actor type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            own: HandlerLayer::new(name.into()),
            inherited: Vec::new(),
            on_unhandled: None,
            gate: CapabilityGate::default(),
            transient: None,
            troupe: None,
            hooks: Hooks::default(),
        }
    }

    /// Starts an actor type that derives from `base`.
    ///
    /// The new type inherits all of `base`'s handlers, its fallback, capability
    /// predicates, overlays and hooks. Handlers registered on the new type take
    /// precedence and may return [`Handled::Defer`](crate::common::Handled::Defer)
    /// to hand the same message on to `base`'s handler.
    pub fn derive(name: impl Into<String>, base: &ActorType<State>) -> Self {
        let base = &base.0;
        Self {
            own: HandlerLayer::new(name.into()),
            inherited: base.layers.clone(),
            on_unhandled: base.on_unhandled.clone(),
            gate: base.gate.clone(),
            transient: base.transient,
            troupe: base.troupe.clone(),
            hooks: base.hooks.clone(),
        }
    }

    /// Registers a handler for messages of type `M`.
    ///
    /// The handler also receives messages whose type is linked below `M` in
    /// the runtime's [`MessageHierarchy`](crate::message::MessageHierarchy)
    /// when nothing more specific handles them.
    pub fn on<M>(
        &mut self,
        handler: impl for<'a, 'b> Fn(&'a mut ManagedActor<State>, &'b mut MessageContext<M>) -> HandlerFuture
            + Send
            + Sync
            + 'static,
    ) -> &mut Self
    where
        M: ActorMessage + Clone,
    {
        let erased: ErasedHandler<State> = Arc::new(
            move |actor: &mut ManagedActor<State>,
                  message: &dyn ActorMessage,
                  envelope: &Envelope| {
                let message = message.as_any().downcast_ref::<M>()?.clone();
                let mut ctx = MessageContext {
                    message,
                    reply_envelope: OutboundEnvelope::new(
                        actor.address().clone(),
                        envelope.sender().clone(),
                        actor.runtime().clone(),
                    ),
                };
                Some(handler(actor, &mut ctx))
            },
        );
        trace!(
            "{} handles {}",
            self.own.type_name,
            std::any::type_name::<M>()
        );
        self.own.handlers.insert(TypeId::of::<M>(), erased);
        self
    }

    /// Registers the fallback run when no typed handler matches an application message.
    pub fn on_unhandled<F>(&mut self, handler: F) -> &mut Self
    where
        F: for<'a, 'b> Fn(&'a mut ManagedActor<State>, &'b Envelope) -> HandlerFuture
            + Send
            + Sync
            + 'static,
    {
        self.on_unhandled = Some(Arc::new(handler));
        self
    }

    /// Stacks a capability predicate. See [`CapabilityGate`].
    pub fn require<F>(&mut self, check: F) -> &mut Self
    where
        F: Fn(&Capabilities, &Requirements) -> bool + Send + Sync + 'static,
    {
        self.gate.require(check);
        self
    }

    /// Makes instances exit on their own according to `policy`.
    pub fn transient(&mut self, policy: TransientPolicy) -> &mut Self {
        self.transient = Some(policy);
        self
    }

    /// Serves this type through an elastic worker pool.
    pub fn troupe(&mut self, settings: TroupeSettings) -> &mut Self {
        self.troupe = Some(settings.effective());
        self
    }

    /// Runs after the instance is created, before its first message.
    pub fn after_start<F>(&mut self, hook: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut ManagedActor<State>) -> HandlerFuture + Send + Sync + 'static,
    {
        self.hooks.after_start = Some(Arc::new(hook));
        self
    }

    /// Runs when the instance starts terminating, before its children are stopped.
    pub fn before_stop<F>(&mut self, hook: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut ManagedActor<State>) -> HandlerFuture + Send + Sync + 'static,
    {
        self.hooks.before_stop = Some(Arc::new(hook));
        self
    }

    /// Runs last, after the parent has been notified.
    pub fn after_stop<F>(&mut self, hook: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut ManagedActor<State>) -> HandlerFuture + Send + Sync + 'static,
    {
        self.hooks.after_stop = Some(Arc::new(hook));
        self
    }

    /// Freezes the definition into a shareable [`ActorType`].
    #[must_use]
    pub fn register(&self) -> ActorType<State> {
        let mut layers = Vec::with_capacity(self.inherited.len() + 1);
        layers.push(self.own.clone());
        layers.extend(self.inherited.iter().cloned());
        ActorType(Arc::new(ActorTypeInner {
            name: self.own.type_name.clone(),
            layers,
            on_unhandled: self.on_unhandled.clone(),
            gate: self.gate.clone(),
            transient: self.transient,
            troupe: self.troupe.clone(),
            hooks: self.hooks.clone(),
        }))
    }
}

struct ActorTypeInner<State: Default + Send + Debug + 'static> {
    name: String,
    layers: Vec<HandlerLayer<State>>,
    on_unhandled: Option<FallbackHandler<State>>,
    gate: CapabilityGate,
    transient: Option<TransientPolicy>,
    troupe: Option<TroupeSettings>,
    hooks: Hooks<State>,
}

/// A registered actor type, shared by every instance created from it.
pub struct ActorType<State: Default + Send + Debug + 'static>(Arc<ActorTypeInner<State>>);

impl<State: Default + Send + Debug + 'static> Clone for ActorType<State> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<State: Default + Send + Debug + 'static> Debug for ActorType<State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorType")
            .field("name", &self.0.name)
            .field(
                "layers",
                &self
                    .0
                    .layers
                    .iter()
                    .map(|layer| layer.type_name.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("gate", &self.0.gate)
            .field("transient", &self.0.transient)
            .field("troupe", &self.0.troupe)
            .finish_non_exhaustive()
    }
}

impl<State: Default + Send + Debug + 'static> ActorType<State> {
    /// The type's name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The capability predicates instances of this type must satisfy.
    #[inline]
    #[must_use]
    pub fn gate(&self) -> &CapabilityGate {
        &self.0.gate
    }

    /// Whether instances are served through a worker pool.
    #[inline]
    #[must_use]
    pub fn is_troupe(&self) -> bool {
        self.0.troupe.is_some()
    }

    /// Handler layers, most derived first.
    #[inline]
    pub(crate) fn layers(&self) -> &[HandlerLayer<State>] {
        &self.0.layers
    }

    #[inline]
    pub(crate) fn fallback(&self) -> Option<FallbackHandler<State>> {
        self.0.on_unhandled.clone()
    }

    #[inline]
    pub(crate) fn after_start_hook(&self) -> Option<LifecycleHook<State>> {
        self.0.hooks.after_start.clone()
    }

    #[inline]
    pub(crate) fn before_stop_hook(&self) -> Option<LifecycleHook<State>> {
        self.0.hooks.before_stop.clone()
    }

    #[inline]
    pub(crate) fn after_stop_hook(&self) -> Option<LifecycleHook<State>> {
        self.0.hooks.after_stop.clone()
    }

    /// Builds the behavior chain for one new instance.
    ///
    /// Workers get only the worker overlay: their lifetime belongs to the pool,
    /// so the transient overlay never applies to them.
    pub(crate) fn behavior(&self, role: Role) -> Box<dyn Behavior<State>> {
        let dispatcher: Box<dyn Behavior<State>> = Box::new(Dispatcher::new(self.clone()));
        if role == Role::TroupeWorker {
            return Box::new(TroupeWorker::new(dispatcher));
        }
        let core: Box<dyn Behavior<State>> = match &self.0.troupe {
            Some(settings) => Box::new(TroupeManager::new(settings.clone(), dispatcher)),
            None => dispatcher,
        };
        match self.0.transient {
            Some(policy) => Box::new(Transient::new(policy, core)),
            None => core,
        }
    }
}
