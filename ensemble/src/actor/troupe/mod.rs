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

//! Troupes: one address served by an elastic pool of worker instances.
//!
//! The instance created by `create_actor` for a troupe type becomes the
//! *manager*. Application messages sent to it are wrapped as work and handed
//! to workers, which are full instances of the same actor type. The pool grows
//! on demand up to `max_count`, keeps `idle_count` workers warm, dismisses
//! surplus idle workers after `grace_period`, and requeues the work of workers
//! that die while holding it.
//!
//! A worker that sets [`work_in_progress`](crate::actor::ManagedActor::set_work_in_progress)
//! keeps its pool slot until it clears the flag, so one work item can span
//! several message exchanges or timers.

use std::time::Duration;

use crate::common::config::{TroupeConfig, CONFIG};
use crate::message::Address;
use crate::traits::ActorMessage;

pub(crate) use manager::TroupeManager;
pub(crate) use worker::TroupeWorker;

mod manager;
mod pool;
mod worker;

/// Sizing of a troupe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TroupeSettings {
    /// Hard ceiling on concurrently live workers. At least 1.
    pub max_count: usize,
    /// Workers kept warm with no work. At most `max_count`.
    pub idle_count: usize,
    /// How long surplus idle workers linger before dismissal.
    pub grace_period: Duration,
}

impl TroupeSettings {
    /// Settings with the configured default grace period.
    #[must_use]
    pub fn new(max_count: usize, idle_count: usize) -> Self {
        Self {
            max_count,
            idle_count,
            ..Self::default()
        }
        .effective()
    }

    /// Replaces the grace period.
    #[must_use]
    pub const fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Settings taken from the `[troupe]` configuration section.
    #[must_use]
    pub fn from_config(config: &TroupeConfig) -> Self {
        Self {
            max_count: config.max_count,
            idle_count: config.idle_count,
            grace_period: Duration::from_millis(config.grace_period_ms),
        }
        .effective()
    }

    /// Clamps the counts to their valid ranges.
    #[must_use]
    pub fn effective(mut self) -> Self {
        self.max_count = self.max_count.max(1);
        self.idle_count = self.idle_count.min(self.max_count);
        self
    }
}

impl Default for TroupeSettings {
    fn default() -> Self {
        Self::from_config(&CONFIG.troupe)
    }
}

/// Control messages understood by a troupe manager. Each is answered with a
/// [`TroupeStatus`] carrying the effective values after the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TroupeControl {
    /// Report the current state.
    Status,
    /// Change the worker ceiling.
    SetMaxCount(usize),
    /// Change the warm-worker target.
    SetIdleCount(usize),
}

/// A snapshot of a troupe's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TroupeStatus {
    /// Effective worker ceiling.
    pub max_count: usize,
    /// Effective warm-worker target.
    pub idle_count: usize,
    /// Live workers.
    pub workers: usize,
    /// Workers idle and kept warm.
    pub idle_workers: usize,
    /// Surplus idle workers awaiting dismissal.
    pub extra_workers: usize,
    /// Work items waiting for a worker.
    pub pending: usize,
    /// Work items assigned to a worker and not yet completed.
    pub in_flight: usize,
}

/// A unit of work handed from the manager to a worker.
#[derive(Debug, Clone)]
pub(crate) struct TroupeWork {
    pub(crate) id: u32,
    pub(crate) message: Box<dyn ActorMessage>,
    pub(crate) sender: Address,
}

/// Sent by a worker to its manager when it has no work in progress.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TroupeWorkerReady {
    pub(crate) completed: Option<u32>,
}

/// Sent by a worker to its manager when a work item had no handler. The item
/// has been returned to its sender as poison and must not be requeued.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TroupeWorkRejected {
    pub(crate) id: u32,
}

/// Timer payload for the manager's dismissal grace period.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GraceExpired;
