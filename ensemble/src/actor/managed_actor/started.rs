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
use std::panic::AssertUnwindSafe;

use futures::future::join_all;
use futures::FutureExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, instrument, trace, warn};

use crate::actor::ManagedActor;
use crate::common::ActorRuntime;
use crate::message::{
    is_lifecycle_message, Address, ChildActorExited, Envelope, ExitRequest, PoisonMessage,
    TerminationReason,
};
use crate::traits::{Behavior, Delivery};

impl<State: Default + Send + Debug + 'static> ManagedActor<State> {
    /// The instance's task: runs `after_start`, processes messages one at a
    /// time until an exit request, cancellation or a dispatch fault, then
    /// terminates.
    #[instrument(skip_all)]
    pub(crate) async fn run(
        mut self,
        mut behavior: Box<dyn Behavior<State>>,
        mut inbox: UnboundedReceiver<Envelope>,
    ) {
        if let Some(hook) = self.actor_type.after_start_hook() {
            hook(&mut self).await;
        }

        let cancel = self.cancellation_token.clone();
        let (reason, recursive) = loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    trace!("Forceful cancellation triggered for actor: {}", self.address);
                    break (TerminationReason::Cancelled, true);
                }
                incoming = inbox.recv() => {
                    let Some(envelope) = incoming else {
                        break (TerminationReason::InboxClosed, true);
                    };
                    trace!("{} received {} from {}", self.address, envelope.message().type_name(), envelope.sender());
                    if let Some(exit) = self.process(behavior.as_mut(), envelope).await {
                        break exit;
                    }
                }
            }
        };

        self.terminate(reason, recursive, inbox).await;
    }

    /// Delivers one envelope through the behavior chain. Returns the
    /// termination reason when this envelope ends the instance.
    async fn process(
        &mut self,
        behavior: &mut dyn Behavior<State>,
        envelope: Envelope,
    ) -> Option<(TerminationReason, bool)> {
        if let Some(exited) = envelope.downcast_ref::<ChildActorExited>() {
            self.children.remove(&exited.child);
        }
        let exit = envelope.downcast_ref::<ExitRequest>().copied();
        let lifecycle = is_lifecycle_message(envelope.message());

        match self.deliver_with_retry(behavior, &envelope).await {
            Some(Delivery::Handled) => {}
            Some(Delivery::Unhandled) if !lifecycle => {
                let (message, _) = envelope.poison_parts();
                let type_name = (*message).type_name().to_string();
                warn!("{} has no handler for {}; exiting", self.address, type_name);
                self.poison(&envelope, format!("no handler for {type_name}"));
                return Some((TerminationReason::Unhandled(type_name), true));
            }
            Some(Delivery::Unhandled) => {}
            None => {
                behavior.abandoned(self, &envelope);
                if !lifecycle {
                    self.poison(&envelope, "handler panicked".to_string());
                }
            }
        }

        exit.map(|request| (TerminationReason::Normal, request.recursive))
    }

    /// Runs the behavior, retrying after a panic up to the configured count.
    /// `None` means every attempt panicked.
    async fn deliver_with_retry(
        &mut self,
        behavior: &mut dyn Behavior<State>,
        envelope: &Envelope,
    ) -> Option<Delivery> {
        let attempts = self
            .runtime
            .config()
            .limits
            .handler_retry_count
            .saturating_add(1);
        for attempt in 1..=attempts {
            match AssertUnwindSafe(behavior.receive(self, envelope.clone()))
                .catch_unwind()
                .await
            {
                Ok(delivery) => return Some(delivery),
                Err(panic) => {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "No error message".to_string());
                    error!(
                        "Handler for {} on {} panicked (attempt {}/{}): {}",
                        envelope.message().type_name(),
                        self.address,
                        attempt,
                        attempts,
                        message
                    );
                }
            }
        }
        None
    }

    /// Returns the failed message to whoever sent it.
    fn poison(&self, envelope: &Envelope, reason: String) {
        let (message, sender) = envelope.poison_parts();
        debug!("Returning {} to {} as poison", (*message).type_name(), sender);
        let poison = PoisonMessage {
            message,
            intended: self.address.clone(),
            reason,
        };
        if let Err(e) = self.send(&sender, poison) {
            trace!("Poison for {} not deliverable: {}", sender, e);
        }
    }

    /// Runs the termination sequence. Consumes the instance.
    async fn terminate(
        mut self,
        reason: TerminationReason,
        recursive: bool,
        mut inbox: UnboundedReceiver<Envelope>,
    ) {
        debug!("{} terminating: {:?}", self.address, reason);

        if let Some(hook) = self.actor_type.before_stop_hook() {
            hook(&mut self).await;
        }

        let children: Vec<Address> = self.children.drain().collect();
        if recursive {
            terminate_children(self.runtime.clone(), self.address.clone(), children).await;
        } else if !children.is_empty() {
            debug!("{} leaves {} children running", self.address, children.len());
        }

        self.runtime.unregister(&self.address);
        inbox.close();
        while let Ok(envelope) = inbox.try_recv() {
            self.runtime.dead_letter(envelope);
        }

        if let Some(parent) = self.parent.clone() {
            let notice = ChildActorExited {
                child: self.address.clone(),
                reason,
            };
            if let Err(e) = self.send(&parent, notice) {
                trace!("Could not notify parent {}: {}", parent, e);
            }
        }

        if let Some(hook) = self.actor_type.after_stop_hook() {
            hook(&mut self).await;
        }

        self.cancellation_token.cancel();
        trace!("Actor {} stopped.", self.address);
    }
}

/// Result of attempting to stop a single child actor.
enum ChildStopResult {
    /// Child stopped successfully
    Success,
    /// The exit request could not be sent
    Error { child_id: String, error: String },
    /// Child stop timed out
    Timeout { child_id: String },
}

/// Asks every child to exit and waits for each, concurrently.
///
/// A free function so the future does not borrow the instance, whose state
/// is `Send` but not `Sync`. Failures are aggregated into one log line each.
async fn terminate_children(runtime: ActorRuntime, parent: Address, children: Vec<Address>) {
    if children.is_empty() {
        return;
    }
    trace!("Terminating {} children of {}", children.len(), parent);
    let timeout = runtime.config().actor_shutdown_timeout();

    let stops = children.into_iter().map(|child| {
        let runtime = runtime.clone();
        let parent = parent.clone();
        async move {
            let tracker = runtime.tracker_of(&child);
            let request = Envelope::new(ExitRequest::default(), parent, child.clone());
            if let Err(e) = runtime.deliver(request) {
                return ChildStopResult::Error {
                    child_id: child.to_string(),
                    error: e.to_string(),
                };
            }
            let Some(tracker) = tracker else {
                return ChildStopResult::Success;
            };
            match tokio::time::timeout(timeout, tracker.wait()).await {
                Ok(()) => ChildStopResult::Success,
                Err(_) => ChildStopResult::Timeout {
                    child_id: child.to_string(),
                },
            }
        }
    });

    let results = join_all(stops).await;

    let mut timeout_children: Vec<&str> = Vec::new();
    let mut error_children: Vec<(&str, &str)> = Vec::new();
    for result in &results {
        match result {
            ChildStopResult::Success => {}
            ChildStopResult::Timeout { child_id } => timeout_children.push(child_id),
            ChildStopResult::Error { child_id, error } => error_children.push((child_id, error)),
        }
    }

    if !timeout_children.is_empty() {
        error!(
            "Shutdown timeout ({} ms) for {} child(ren) of actor {}: [{}]",
            timeout.as_millis(),
            timeout_children.len(),
            parent,
            timeout_children.join(", ")
        );
    }
    if !error_children.is_empty() {
        error!(
            "Shutdown errors for {} child(ren) of actor {}: [{}]",
            error_children.len(),
            parent,
            error_children
                .iter()
                .map(|(id, err)| format!("{id}: {err}"))
                .collect::<Vec<_>>()
                .join("; ")
        );
    }
    trace!("All children stopped for actor: {}.", parent);
}
