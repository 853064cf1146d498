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

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use acton_ern::Ern;
use dashmap::{DashMap, DashSet};
use derive_new::new;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::common::{Capabilities, EnsembleConfig};
use crate::message::{Address, MessageHierarchy};

/// Distinguishes runtime instances inside one process.
static NEXT_SYSTEM: AtomicU64 = AtomicU64::new(1);

/// What the runtime keeps about one live instance.
#[derive(new, Debug, Clone)]
pub(crate) struct ActorEntry {
    /// Tracks the instance's task; `wait()` resolves once it has terminated.
    pub(crate) tracker: TaskTracker,
    pub(crate) parent: Option<Address>,
}

/// Internal state of one runtime instance, shared by every clone of its
/// [`ActorRuntime`](crate::common::ActorRuntime).
pub(crate) struct RuntimeInner {
    /// Stamped into every address this runtime issues.
    pub(crate) system: u64,
    /// The runtime's own address, used as the sender of messages from outside any actor.
    pub(crate) address: Address,
    pub(crate) next_serial: AtomicU64,
    /// Live instances.
    pub(crate) actors: DashMap<Address, ActorEntry>,
    pub(crate) globals: DashMap<String, Address>,
    /// Loaded source hashes.
    pub(crate) sources: DashSet<String>,
    pub(crate) capabilities: RwLock<Capabilities>,
    pub(crate) hierarchy: RwLock<MessageHierarchy>,
    pub(crate) dead_letters: RwLock<Option<Address>>,
    /// Pending `wakeup_after` timers.
    pub(crate) timers: TaskTracker,
    /// Root of every instance's cancellation token.
    pub(crate) cancellation_token: CancellationToken,
    pub(crate) config: EnsembleConfig,
}

impl RuntimeInner {
    pub(crate) fn new(config: EnsembleConfig) -> Self {
        let system = NEXT_SYSTEM.fetch_add(1, Ordering::Relaxed);
        // Nothing reads the runtime's own inbox: replies sent to it are dead letters.
        let (outbox, _) = mpsc::unbounded_channel();
        let id = Ern::with_root("ensemble").unwrap_or_default();
        Self {
            system,
            address: Address::new(id, 1, system, Some(outbox)),
            next_serial: AtomicU64::new(2),
            actors: DashMap::new(),
            globals: DashMap::new(),
            sources: DashSet::new(),
            capabilities: RwLock::new(config.capabilities.clone()),
            hierarchy: RwLock::new(MessageHierarchy::default()),
            dead_letters: RwLock::new(None),
            timers: TaskTracker::new(),
            cancellation_token: CancellationToken::new(),
            config,
        }
    }
}

impl fmt::Debug for RuntimeInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeInner")
            .field("system", &self.system)
            .field("actors", &self.actors.len())
            .field("globals", &self.globals.len())
            .field("sources", &self.sources.len())
            .field("capabilities", &*self.capabilities.read())
            .field("dead_letters", &*self.dead_letters.read())
            .finish_non_exhaustive()
    }
}
