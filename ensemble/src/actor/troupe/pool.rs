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

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{error, trace};

use crate::actor::troupe::{TroupeSettings, TroupeStatus, TroupeWork};
use crate::message::Address;
use crate::traits::ActorMessage;

/// Application work accepted by the manager but not yet completed.
#[derive(Debug, Clone)]
pub(crate) struct PendingWork {
    pub(crate) message: Box<dyn ActorMessage>,
    pub(crate) sender: Address,
}

/// A work item bound to the worker that must receive it.
#[derive(Debug, Clone)]
pub(crate) struct Assignment {
    pub(crate) worker: Address,
    pub(crate) work: TroupeWork,
}

/// What the manager must do after a worker reports readiness.
#[derive(Debug)]
pub(crate) enum ReadyOutcome {
    /// Send this work to the worker.
    Assign(Assignment),
    /// The worker became surplus and the grace timer must be armed.
    ArmGrace,
    /// The worker is idle, or already surplus with the timer running.
    Parked,
    /// The report did not come from a live worker.
    Ignored,
}

/// The manager's private pool bookkeeping.
///
/// Mutated only from the manager's own message processing, so it needs no
/// synchronization. Every method that may need a new worker takes a `spawn`
/// closure returning the new worker's address, or `None` if creation failed.
#[derive(Debug)]
pub(crate) struct TroupePool {
    settings: TroupeSettings,
    workers: Vec<Address>,
    idle: VecDeque<Address>,
    extras: Vec<Address>,
    dismissed: HashSet<Address>,
    pending: VecDeque<PendingWork>,
    in_flight: HashMap<u32, (Address, PendingWork)>,
    next_id: u32,
    id_bound: u32,
    grace_armed: bool,
}

impl TroupePool {
    pub(crate) fn new(settings: TroupeSettings) -> Self {
        Self::with_id_bound(settings, u32::MAX)
    }

    /// Work ids are drawn from `0..id_bound`, wrapping.
    pub(crate) fn with_id_bound(settings: TroupeSettings, id_bound: u32) -> Self {
        Self {
            settings: settings.effective(),
            workers: Vec::new(),
            idle: VecDeque::new(),
            extras: Vec::new(),
            dismissed: HashSet::new(),
            pending: VecDeque::new(),
            in_flight: HashMap::new(),
            next_id: 0,
            id_bound: id_bound.max(1),
            grace_armed: false,
        }
    }

    pub(crate) const fn settings(&self) -> &TroupeSettings {
        &self.settings
    }

    /// Whether `address` is a live worker.
    pub(crate) fn is_worker(&self, address: &Address) -> bool {
        self.workers.contains(address)
    }

    /// Whether `address` is a live or dismissed worker whose exit the pool still expects.
    pub(crate) fn tracks(&self, address: &Address) -> bool {
        self.is_worker(address) || self.dismissed.contains(address)
    }

    pub(crate) fn status(&self) -> TroupeStatus {
        TroupeStatus {
            max_count: self.settings.max_count,
            idle_count: self.settings.idle_count,
            workers: self.workers.len(),
            idle_workers: self.idle.len(),
            extra_workers: self.extras.len(),
            pending: self.pending.len(),
            in_flight: self.in_flight.len(),
        }
    }

    /// Returns `true` when the grace timer must be armed for newly surplus workers.
    pub(crate) fn set_max_count(&mut self, max_count: usize) -> bool {
        self.settings.max_count = max_count;
        self.settings = self.settings.clone().effective();
        self.shed_idle()
    }

    /// Returns `true` when the grace timer must be armed for newly surplus workers.
    pub(crate) fn set_idle_count(&mut self, idle_count: usize) -> bool {
        self.settings.idle_count = idle_count;
        self.settings = self.settings.clone().effective();
        self.shed_idle()
    }

    /// Moves idle workers above the warm target to the surplus set.
    fn shed_idle(&mut self) -> bool {
        while self.idle.len() > self.settings.idle_count {
            let Some(worker) = self.idle.pop_back() else {
                break;
            };
            trace!("Worker {worker} is now surplus");
            self.extras.push(worker);
        }
        if self.extras.is_empty() || self.grace_armed {
            return false;
        }
        self.grace_armed = true;
        true
    }

    /// Accepts new work: an idle worker first, then a surplus worker (cancelling
    /// its dismissal), then a new worker if below `max_count`; otherwise it queues.
    pub(crate) fn submit(
        &mut self,
        work: PendingWork,
        mut spawn: impl FnMut() -> Option<Address>,
    ) -> Option<Assignment> {
        if let Some(worker) = self.idle.pop_front() {
            return self.assign(worker, work);
        }
        if let Some(worker) = self.extras.pop() {
            trace!("Reusing surplus worker {worker}");
            return self.assign(worker, work);
        }
        if self.workers.len() < self.settings.max_count {
            if let Some(worker) = spawn() {
                self.workers.push(worker.clone());
                return self.assign(worker, work);
            }
        }
        trace!("All {} workers busy; queueing work", self.workers.len());
        self.pending.push_back(work);
        None
    }

    /// Handles a worker's readiness report.
    pub(crate) fn worker_ready(&mut self, worker: &Address, completed: Option<u32>) -> ReadyOutcome {
        if !self.is_worker(worker) {
            return ReadyOutcome::Ignored;
        }
        if let Some(id) = completed {
            if self
                .in_flight
                .get(&id)
                .is_some_and(|(holder, _)| holder == worker)
            {
                self.in_flight.remove(&id);
            }
        }
        self.idle.retain(|idle| idle != worker);
        self.extras.retain(|extra| extra != worker);

        if let Some(work) = self.pending.pop_front() {
            return self
                .assign(worker.clone(), work)
                .map_or(ReadyOutcome::Parked, ReadyOutcome::Assign);
        }

        let idle_count = self.settings.idle_count;
        if self.workers.len() > idle_count && self.idle.len() >= idle_count {
            self.extras.push(worker.clone());
            if !self.grace_armed {
                self.grace_armed = true;
                return ReadyOutcome::ArmGrace;
            }
            return ReadyOutcome::Parked;
        }

        self.idle.push_back(worker.clone());
        ReadyOutcome::Parked
    }

    /// Retires work a worker had no handler for. It was already returned to
    /// its sender, so the worker's exit must not requeue it.
    pub(crate) fn work_rejected(&mut self, worker: &Address, id: u32) {
        if self
            .in_flight
            .get(&id)
            .is_some_and(|(holder, _)| holder == worker)
        {
            trace!("Work {id} rejected by {worker}");
            self.in_flight.remove(&id);
        }
    }

    /// Dismisses every surplus worker. They leave the pool immediately; their
    /// exit notifications are still recognised through [`tracks`](Self::tracks).
    pub(crate) fn grace_expired(&mut self) -> Vec<Address> {
        self.grace_armed = false;
        let dismissed: Vec<Address> = self.extras.drain(..).collect();
        self.workers.retain(|worker| !dismissed.contains(worker));
        self.dismissed.extend(dismissed.iter().cloned());
        dismissed
    }

    /// Handles a worker's termination.
    ///
    /// Work it held goes to an idle worker or back to the front of the queue.
    /// If work is waiting and no worker is left at all, one replacement is
    /// spawned.
    pub(crate) fn worker_exited(
        &mut self,
        worker: &Address,
        mut spawn: impl FnMut() -> Option<Address>,
    ) -> Vec<Assignment> {
        self.dismissed.remove(worker);
        self.workers.retain(|live| live != worker);
        self.idle.retain(|idle| idle != worker);
        self.extras.retain(|extra| extra != worker);

        let orphaned: Vec<u32> = self
            .in_flight
            .iter()
            .filter(|(_, (holder, _))| holder == worker)
            .map(|(id, _)| *id)
            .collect();

        let mut assignments = Vec::new();
        for id in orphaned {
            let Some((_, work)) = self.in_flight.remove(&id) else {
                continue;
            };
            trace!("Requeueing work {id} held by {worker}");
            match self.idle.pop_front() {
                Some(idle) => assignments.extend(self.assign(idle, work)),
                None => self.pending.push_front(work),
            }
        }

        if self.workers.is_empty() {
            if let Some(work) = self.pending.pop_front() {
                match spawn() {
                    Some(replacement) => {
                        self.workers.push(replacement.clone());
                        assignments.extend(self.assign(replacement, work));
                    }
                    None => self.pending.push_front(work),
                }
            }
        }
        assignments
    }

    /// Starts workers for queued work while below `max_count`.
    pub(crate) fn fill(&mut self, mut spawn: impl FnMut() -> Option<Address>) -> Vec<Assignment> {
        let mut assignments = Vec::new();
        while !self.pending.is_empty() && self.workers.len() < self.settings.max_count {
            let Some(worker) = spawn() else {
                break;
            };
            self.workers.push(worker.clone());
            if let Some(work) = self.pending.pop_front() {
                assignments.extend(self.assign(worker, work));
            }
        }
        assignments
    }

    fn assign(&mut self, worker: Address, work: PendingWork) -> Option<Assignment> {
        let Some(id) = self.next_work_id() else {
            error!(
                "{} work items in flight exhaust the id space; holding work back",
                self.in_flight.len()
            );
            self.pending.push_front(work);
            self.idle.push_back(worker);
            return None;
        };
        let assignment = Assignment {
            worker: worker.clone(),
            work: TroupeWork {
                id,
                message: work.message.clone(),
                sender: work.sender.clone(),
            },
        };
        self.in_flight.insert(id, (worker, work));
        Some(assignment)
    }

    fn next_work_id(&mut self) -> Option<u32> {
        if self.in_flight.len() >= self.id_bound as usize {
            return None;
        }
        loop {
            let id = self.next_id;
            self.next_id = (self.next_id + 1) % self.id_bound;
            if !self.in_flight.contains_key(&id) {
                return Some(id);
            }
        }
    }
}
