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
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use acton_ern::Ern;
use anyhow::anyhow;
use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendError;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, instrument, trace};

use crate::actor::{spawn_actor, ActorConfig, ActorType, CapabilityHost, Role};
use crate::common::runtime_inner::{ActorEntry, RuntimeInner};
use crate::common::{Capabilities, CapabilityValue, EnsembleConfig};
use crate::message::{
    is_lifecycle_message, Address, CreateError, DeadEnvelope, Envelope, ExitRequest,
    MessageError, OutboundEnvelope,
};
use crate::traits::ActorMessage;

/// A running Ensemble runtime.
///
/// Obtained from [`Ensemble::launch`](crate::common::Ensemble::launch). Cheap
/// to clone; every clone refers to the same runtime. It creates top-level
/// actors, sends messages from outside any actor, holds the global-name,
/// source-reference and dead-letter registries, and shuts the system down.
#[derive(Debug, Clone)]
pub struct ActorRuntime(pub(crate) Arc<RuntimeInner>);

impl ActorRuntime {
    /// Creates a top-level actor.
    ///
    /// If `config` carries a global name that is already registered, the
    /// registered address is returned and nothing else in `config` is looked at.
    ///
    /// # Errors
    ///
    /// *   [`CreateError::InvalidSourceRef`] if the source reference is not loaded.
    /// *   [`CreateError::NoCompatibleHost`] if the actor type's capability gate
    ///     rejects this runtime.
    /// *   [`CreateError::InvalidName`] if the name cannot form an identifier.
    #[instrument(skip(self, actor_type), fields(actor_type = actor_type.name()))]
    pub fn create_actor<State: Default + Send + Debug + 'static>(
        &self,
        actor_type: &ActorType<State>,
        config: ActorConfig,
    ) -> Result<Address, CreateError> {
        spawn_actor(self, actor_type, config, None, Role::Standalone).map(|(address, _)| address)
    }

    /// Sends `message` to `recipient` with the runtime as sender.
    ///
    /// # Errors
    ///
    /// Addressing faults only; see [`MessageError`].
    pub fn send(&self, recipient: &Address, message: impl ActorMessage) -> Result<(), MessageError> {
        self.deliver(Envelope::new(
            message,
            self.0.address.clone(),
            recipient.clone(),
        ))
    }

    /// A reusable send from the runtime to `recipient`.
    #[must_use]
    pub fn envelope_to(&self, recipient: &Address) -> OutboundEnvelope {
        OutboundEnvelope::new(self.0.address.clone(), recipient.clone(), self.clone())
    }

    /// Sends `message` and waits up to `timeout` for the first message sent back.
    ///
    /// The request goes out from a one-off address; whatever the recipient sends
    /// to the sender of the request is the reply. `Ok(None)` means no reply
    /// will come: either `timeout` elapsed, or every copy of the request's
    /// sender was dropped. The latter returns at once, for example when the
    /// recipient has already exited and no dead-letter handler holds the request.
    ///
    /// # Errors
    ///
    /// Addressing faults only; see [`MessageError`].
    #[instrument(skip(self, message))]
    pub async fn ask(
        &self,
        recipient: &Address,
        message: impl ActorMessage,
        timeout: Duration,
    ) -> Result<Option<Envelope>, MessageError> {
        let (outbox, mut inbox) = mpsc::unbounded_channel();
        let proxy = self.issue_address(Ern::with_root("ask").unwrap_or_default(), outbox);
        self.deliver(Envelope::new(message, proxy, recipient.clone()))?;
        match tokio::time::timeout(timeout, inbox.recv()).await {
            Ok(reply) => Ok(reply),
            Err(_) => {
                trace!("No reply from {} within {:?}", recipient, timeout);
                Ok(None)
            }
        }
    }

    /// [`ask`](Self::ask) with the configured default timeout.
    ///
    /// # Errors
    ///
    /// Addressing faults only; see [`MessageError`].
    pub async fn ask_default(
        &self,
        recipient: &Address,
        message: impl ActorMessage,
    ) -> Result<Option<Envelope>, MessageError> {
        self.ask(recipient, message, self.0.config.ask_timeout())
            .await
    }

    /// Asks the actor to exit (recursively) and waits for it to terminate.
    ///
    /// Stopping an address that is not alive succeeds immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the exit request cannot be sent or the actor does not
    /// terminate within `timeouts.actor_shutdown_timeout_ms`.
    #[instrument(skip(self))]
    pub async fn stop(&self, address: &Address) -> anyhow::Result<()> {
        let Some(tracker) = self.tracker_of(address) else {
            trace!("{} is not alive; nothing to stop", address);
            return Ok(());
        };
        self.send(address, ExitRequest::default())?;
        let timeout = self.0.config.actor_shutdown_timeout();
        tokio::time::timeout(timeout, tracker.wait())
            .await
            .map_err(|_| anyhow!("Actor {address} did not stop within {} ms", timeout.as_millis()))
    }

    /// Stops every top-level actor concurrently, then cancels whatever is left.
    ///
    /// Actors whose parent has already exited count as top-level here.
    ///
    /// # Errors
    ///
    /// Returns an error if any actor failed to stop, or if the whole shutdown
    /// exceeded `timeouts.system_shutdown_timeout_ms`. Remaining actors are
    /// force-cancelled in either case.
    #[instrument(skip(self))]
    pub async fn shutdown_all(&self) -> anyhow::Result<()> {
        let entries: Vec<(Address, Option<Address>)> = self
            .0
            .actors
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().parent.clone()))
            .collect();
        let roots: Vec<Address> = entries
            .into_iter()
            .filter(|(_, parent)| parent.as_ref().map_or(true, |parent| !self.is_alive(parent)))
            .map(|(address, _)| address)
            .collect();
        debug!("Shutting down {} top-level actors", roots.len());

        let timeout = self.0.config.system_shutdown_timeout();
        let stops = roots
            .iter()
            .map(|root| async move { (root, self.stop(root).await) });

        let result = match tokio::time::timeout(timeout, join_all(stops)).await {
            Ok(results) => {
                let failures: Vec<String> = results
                    .into_iter()
                    .filter_map(|(root, result)| result.err().map(|e| format!("{root}: {e}")))
                    .collect();
                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(anyhow!(
                        "{} actor(s) failed to stop: [{}]",
                        failures.len(),
                        failures.join("; ")
                    ))
                }
            }
            Err(_) => {
                error!(
                    "System shutdown timeout ({} ms); cancelling remaining actors",
                    timeout.as_millis()
                );
                Err(anyhow!(
                    "System shutdown did not complete within {} ms",
                    timeout.as_millis()
                ))
            }
        };

        self.0.cancellation_token.cancel();
        self.0.timers.close();
        self.0.timers.wait().await;
        debug!("Ensemble system {} shut down", self.0.system);
        result
    }

    /// Whether `address` names a live actor of this runtime.
    #[must_use]
    pub fn is_alive(&self, address: &Address) -> bool {
        self.0.actors.contains_key(address)
    }

    /// Number of live actors, workers included.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.0.actors.len()
    }

    /// The actor registered under `name`, if it is still alive.
    #[must_use]
    pub fn lookup_global(&self, name: &str) -> Option<Address> {
        self.0.globals.get(name).map(|entry| entry.value().clone())
    }

    /// Marks a source hash as loaded, so actors may be created from it.
    pub fn register_source(&self, hash: impl Into<String>) {
        self.0.sources.insert(hash.into());
    }

    /// Forgets a source hash. Running actors created from it are unaffected.
    pub fn unregister_source(&self, hash: &str) -> bool {
        self.0.sources.remove(hash).is_some()
    }

    /// Whether a source hash is loaded.
    #[must_use]
    pub fn has_source(&self, hash: &str) -> bool {
        self.0.sources.contains(hash)
    }

    /// Routes undeliverable application messages to `handler` as [`DeadEnvelope`]s.
    pub fn handle_dead_letters(&self, handler: &Address) {
        debug!("Dead letters now go to {}", handler);
        *self.0.dead_letters.write() = Some(handler.clone());
    }

    /// Stops routing dead letters; they are dropped from now on.
    pub fn stop_dead_letters(&self) {
        *self.0.dead_letters.write() = None;
    }

    /// Updates a host capability. Affects future placements only.
    pub fn update_capability(&self, name: impl Into<String>, value: impl Into<CapabilityValue>) {
        self.0.capabilities.write().set(name, value);
    }

    /// Removes a host capability. Affects future placements only.
    pub fn remove_capability(&self, name: &str) -> Option<CapabilityValue> {
        self.0.capabilities.write().remove(name)
    }

    /// Declares `Base` as the base message type of `Sub` for dispatch.
    ///
    /// Returns `false` when the link is rejected as a duplicate or a cycle.
    pub fn link<Sub, Base>(&self) -> bool
    where
        Sub: ActorMessage + Clone + Into<Base>,
        Base: ActorMessage,
    {
        self.0.hierarchy.write().link::<Sub, Base>()
    }

    /// The configuration this runtime was launched with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EnsembleConfig {
        &self.0.config
    }

    /// The runtime's own address, the sender of messages sent through [`send`](Self::send).
    #[inline]
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.0.address
    }

    /// Validates the recipient and enqueues the envelope.
    pub(crate) fn deliver(&self, envelope: Envelope) -> Result<(), MessageError> {
        let recipient = envelope.recipient();
        let outbox = match &recipient.outbox {
            Some(outbox) if recipient.serial != 0 => outbox.clone(),
            _ => return Err(MessageError::MalformedAddress(recipient.to_string())),
        };
        if recipient.system != self.0.system {
            return Err(MessageError::ForeignAddress {
                address: recipient.clone(),
                expected_system: self.0.system,
            });
        }
        if let Err(SendError(envelope)) = outbox.send(envelope) {
            self.dead_letter(envelope);
        }
        Ok(())
    }

    /// Handles a message whose recipient has exited.
    pub(crate) fn dead_letter(&self, envelope: Envelope) {
        if is_lifecycle_message(envelope.message()) {
            trace!(
                "Dropping {} for exited {}",
                envelope.message().type_name(),
                envelope.recipient()
            );
            return;
        }
        let handler = self.0.dead_letters.read().clone();
        match handler {
            Some(handler) if handler != *envelope.recipient() => {
                let Envelope {
                    message,
                    sender,
                    recipient,
                } = envelope;
                trace!("Dead letter for {} sent to {}", recipient, handler);
                let report = Envelope::new(
                    DeadEnvelope {
                        intended: recipient,
                        sender,
                        message,
                    },
                    self.0.address.clone(),
                    handler.clone(),
                );
                if let Some(outbox) = &handler.outbox {
                    if outbox.send(report).is_err() {
                        trace!("Dead-letter handler {} has exited", handler);
                    }
                }
            }
            _ => trace!(
                "Dropping {} for exited {}",
                envelope.message().type_name(),
                envelope.recipient()
            ),
        }
    }

    /// Converts a message to its linked base message type.
    pub(crate) fn upcast(&self, message: &dyn ActorMessage) -> Option<Box<dyn ActorMessage>> {
        self.0.hierarchy.read().upcast(message)
    }

    pub(crate) fn issue_address(&self, id: Ern, outbox: mpsc::UnboundedSender<Envelope>) -> Address {
        let serial = self.0.next_serial.fetch_add(1, Ordering::Relaxed);
        Address::new(id, serial, self.0.system, Some(outbox))
    }

    pub(crate) fn register(&self, address: Address, tracker: TaskTracker, parent: Option<Address>) {
        self.0.actors.insert(address, ActorEntry::new(tracker, parent));
    }

    /// Removes a terminated instance from addressing and its global names.
    pub(crate) fn unregister(&self, address: &Address) {
        self.0.actors.remove(address);
        self.0.globals.retain(|_, registered| registered != address);
        let mut dead_letters = self.0.dead_letters.write();
        if dead_letters.as_ref() == Some(address) {
            *dead_letters = None;
        }
    }

    pub(crate) fn tracker_of(&self, address: &Address) -> Option<TaskTracker> {
        self.0
            .actors
            .get(address)
            .map(|entry| entry.value().tracker.clone())
    }
}

impl CapabilityHost for ActorRuntime {
    fn host_name(&self) -> String {
        format!("system-{}", self.0.system)
    }

    fn capabilities(&self) -> Capabilities {
        self.0.capabilities.read().clone()
    }
}
