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

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ensemble::prelude::*;
use ensemble_test::prelude::*;

use crate::setup::actors::Crew;
use crate::setup::messages::{Job, JobDone, Unknown};
use crate::setup::{eventually, eventually_async, initialize_tracing, launch};

mod setup;

/// A worker that holds each job for a timer before answering it.
#[ensemble_actor]
struct Slowpoke {
    holding: Option<(Address, u32)>,
}

async fn status(runtime: &ActorRuntime, troupe: &Address, control: TroupeControl) -> TroupeStatus {
    runtime
        .ask(troupe, control, Duration::from_secs(2))
        .await
        .expect("troupe address is valid")
        .and_then(|reply| reply.into_message::<TroupeStatus>())
        .expect("troupe answers control messages with its status")
}

#[ensemble_test]
async fn test_concurrency_never_exceeds_max_count() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));

    let mut slow = ActorDefinition::<Slowpoke>::new("slow");
    let (job_active, job_peak) = (active.clone(), peak.clone());
    slow.on::<Job>(move |actor, ctx| {
        let now = job_active.fetch_add(1, Ordering::SeqCst) + 1;
        job_peak.fetch_max(now, Ordering::SeqCst);
        actor.model.holding = Some((ctx.sender().clone(), ctx.message().n));
        actor.set_work_in_progress(true);
        actor.wakeup_after(Duration::from_millis(40), JobDone { n: ctx.message().n });
        Reply::ready()
    });
    let (done_active, done_count) = (active.clone(), completed.clone());
    slow.on::<Wakeup>(move |actor, ctx| {
        if let Some(done) = ctx.message().payload::<JobDone>() {
            if let Some((requester, _)) = actor.model.holding.take() {
                let _ = actor.send(&requester, done.clone());
            }
            done_active.fetch_sub(1, Ordering::SeqCst);
            done_count.fetch_add(1, Ordering::SeqCst);
            actor.set_work_in_progress(false);
        }
        Reply::ready()
    });
    slow.troupe(TroupeSettings::new(3, 1));
    let troupe = runtime.create_actor(&slow.register(), ActorConfig::default())?;

    for n in 0..10 {
        runtime.send(&troupe, Job { n })?;
    }

    assert!(eventually(Duration::from_secs(5), || completed.load(Ordering::SeqCst) == 10).await);
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency was {peak}");
    assert!(peak >= 2, "work was never spread across workers");

    assert!(
        eventually_async(Duration::from_secs(2), || async {
            let current = status(&runtime, &troupe, TroupeControl::Status).await;
            current.in_flight == 0 && current.pending == 0
        })
        .await
    );
    let current = status(&runtime, &troupe, TroupeControl::Status).await;
    assert!(current.workers <= 3);

    runtime.shutdown_all().await
}

/// Surplus workers are dismissed after the grace period, down to `idle_count`.
#[ensemble_test]
async fn test_surplus_workers_are_reclaimed() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();

    let mut crew = ActorDefinition::<Crew>::new("crew");
    crew.on::<Job>(|actor, _ctx| {
        actor.model.handled += 1;
        Reply::pending(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
        })
    });
    crew.troupe(TroupeSettings::new(4, 1).with_grace_period(Duration::from_millis(200)));
    let troupe = runtime.create_actor(&crew.register(), ActorConfig::default())?;

    for n in 0..8 {
        runtime.send(&troupe, Job { n })?;
    }
    let busy = status(&runtime, &troupe, TroupeControl::Status).await;
    assert_eq!(busy.workers, 4);
    assert_eq!(busy.pending + busy.in_flight, 8);

    assert!(
        eventually_async(Duration::from_secs(3), || async {
            let current = status(&runtime, &troupe, TroupeControl::Status).await;
            current.workers == 1 && current.idle_workers == 1 && current.extra_workers == 0
        })
        .await
    );
    let settled = status(&runtime, &troupe, TroupeControl::Status).await;
    assert_eq!(settled.in_flight, 0);
    assert_eq!(settled.pending, 0);

    runtime.shutdown_all().await
}

/// Work held by a worker that exits is handed to another worker, and the
/// answer still reaches the original requester.
#[ensemble_test]
async fn test_work_of_exited_worker_is_requeued() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    let crashed = Arc::new(AtomicBool::new(false));
    let attempts = Arc::new(AtomicUsize::new(0));

    let mut fragile = ActorDefinition::<Crew>::new("fragile");
    let (first_time, tries) = (crashed.clone(), attempts.clone());
    fragile.on::<Job>(move |actor, ctx| {
        tries.fetch_add(1, Ordering::SeqCst);
        if !first_time.swap(true, Ordering::SeqCst) {
            actor.set_work_in_progress(true);
            actor.request_exit();
            return Reply::ready();
        }
        let _ = ctx.reply(JobDone { n: ctx.message().n });
        Reply::ready()
    });
    fragile.troupe(TroupeSettings::new(1, 1));
    let troupe = runtime.create_actor(&fragile.register(), ActorConfig::default())?;

    let reply = runtime
        .ask(&troupe, Job { n: 7 }, Duration::from_secs(3))
        .await?
        .and_then(|reply| reply.into_message::<JobDone>());
    assert_eq!(reply.map(|done| done.n), Some(7));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    assert!(
        eventually_async(Duration::from_secs(2), || async {
            let current = status(&runtime, &troupe, TroupeControl::Status).await;
            current.workers == 1 && current.in_flight == 0
        })
        .await
    );

    runtime.shutdown_all().await
}

/// A worker that dies on a stray message it has no handler for still gives
/// back the unrelated work it was holding.
#[ensemble_test]
async fn test_work_survives_worker_killed_by_stray_message() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    let attempts = Arc::new(AtomicUsize::new(0));

    let mut waiting = ActorDefinition::<Crew>::new("waiting");
    let tries = attempts.clone();
    waiting.on::<Job>(move |actor, ctx| {
        if tries.fetch_add(1, Ordering::SeqCst) == 0 {
            actor.set_work_in_progress(true);
            let own = actor.address().clone();
            let _ = actor.send(&own, Unknown);
            return Reply::ready();
        }
        let _ = ctx.reply(JobDone { n: ctx.message().n });
        Reply::ready()
    });
    waiting.troupe(TroupeSettings::new(1, 1));
    let troupe = runtime.create_actor(&waiting.register(), ActorConfig::default())?;

    let reply = runtime
        .ask(&troupe, Job { n: 7 }, Duration::from_secs(3))
        .await?
        .and_then(|reply| reply.into_message::<JobDone>());
    assert_eq!(reply.map(|done| done.n), Some(7));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    assert!(
        eventually_async(Duration::from_secs(2), || async {
            let current = status(&runtime, &troupe, TroupeControl::Status).await;
            current.workers == 1 && current.in_flight == 0 && current.pending == 0
        })
        .await
    );

    runtime.shutdown_all().await
}

/// Lowering the warm target dismisses the idle workers above it after the
/// grace period, without waiting for new work.
#[ensemble_test]
async fn test_lowering_idle_count_reclaims_idle_workers() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();

    let mut crew = ActorDefinition::<Crew>::new("warm");
    crew.on::<Job>(|_actor, _ctx| {
        Reply::pending(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
        })
    });
    crew.troupe(TroupeSettings::new(3, 3).with_grace_period(Duration::from_millis(100)));
    let troupe = runtime.create_actor(&crew.register(), ActorConfig::default())?;

    for n in 0..3 {
        runtime.send(&troupe, Job { n })?;
    }
    assert!(
        eventually_async(Duration::from_secs(2), || async {
            let current = status(&runtime, &troupe, TroupeControl::Status).await;
            current.workers == 3 && current.idle_workers == 3
        })
        .await
    );

    let lowered = status(&runtime, &troupe, TroupeControl::SetIdleCount(1)).await;
    assert_eq!(lowered.idle_count, 1);
    assert_eq!(lowered.idle_workers, 1);
    assert_eq!(lowered.extra_workers, 2);

    assert!(
        eventually_async(Duration::from_secs(2), || async {
            let current = status(&runtime, &troupe, TroupeControl::Status).await;
            current.workers == 1 && current.extra_workers == 0
        })
        .await
    );

    runtime.shutdown_all().await
}

#[ensemble_test]
async fn test_control_messages_are_clamped() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();

    let mut crew = ActorDefinition::<Crew>::new("controlled");
    crew.on::<Job>(|_actor, _ctx| Reply::ready());
    crew.troupe(TroupeSettings::new(3, 1));
    let troupe = runtime.create_actor(&crew.register(), ActorConfig::default())?;

    let initial = status(&runtime, &troupe, TroupeControl::Status).await;
    assert_eq!((initial.max_count, initial.idle_count), (3, 1));

    let shrunk = status(&runtime, &troupe, TroupeControl::SetMaxCount(0)).await;
    assert_eq!((shrunk.max_count, shrunk.idle_count), (1, 1));

    let idle = status(&runtime, &troupe, TroupeControl::SetIdleCount(5)).await;
    assert_eq!((idle.max_count, idle.idle_count), (1, 1));

    let grown = status(&runtime, &troupe, TroupeControl::SetMaxCount(6)).await;
    assert_eq!((grown.max_count, grown.idle_count), (6, 1));

    runtime.shutdown_all().await
}

/// Work no worker handles is returned to the requester as poison and is not
/// retried; the worker that rejected it exits.
#[ensemble_test]
async fn test_unhandled_work_is_poisoned_not_requeued() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();

    let mut crew = ActorDefinition::<Crew>::new("picky");
    crew.on::<Job>(|_actor, _ctx| Reply::ready());
    crew.troupe(TroupeSettings::new(2, 1));
    let troupe = runtime.create_actor(&crew.register(), ActorConfig::default())?;

    let reply = runtime
        .ask(&troupe, Unknown, Duration::from_secs(2))
        .await?
        .expect("poison comes back");
    let poison = reply.into_message::<PoisonMessage>().expect("reply is poison");
    assert!(poison.message::<Unknown>().is_some());
    assert_ne!(poison.intended, troupe);

    assert!(
        eventually_async(Duration::from_secs(2), || async {
            let current = status(&runtime, &troupe, TroupeControl::Status).await;
            current.workers == 0 && current.in_flight == 0 && current.pending == 0
        })
        .await
    );
    assert!(runtime.is_alive(&troupe));

    runtime.shutdown_all().await
}

/// Workers see the original sender, so replies skip the manager.
#[ensemble_test]
async fn test_worker_replies_reach_original_sender() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();

    let mut crew = ActorDefinition::<Crew>::new("echoing");
    crew.on::<Job>(|_actor, ctx| {
        let _ = ctx.reply(JobDone { n: ctx.message().n * 2 });
        Reply::ready()
    });
    crew.troupe(TroupeSettings::new(2, 1));
    let troupe = runtime.create_actor(&crew.register(), ActorConfig::default())?;

    for n in 1..=4 {
        let reply = runtime
            .ask(&troupe, Job { n }, Duration::from_secs(2))
            .await?
            .expect("worker replies");
        assert_ne!(reply.sender(), &troupe);
        assert_eq!(reply.into_message::<JobDone>().map(|done| done.n), Some(n * 2));
    }

    runtime.shutdown_all().await
}

/// Stopping the manager stops its workers with it.
#[ensemble_test]
async fn test_stopping_troupe_stops_workers() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();

    let mut crew = ActorDefinition::<Crew>::new("stoppable");
    crew.on::<Job>(|_actor, _ctx| Reply::ready());
    crew.troupe(TroupeSettings::new(3, 3));
    let troupe = runtime.create_actor(&crew.register(), ActorConfig::default())?;
    for n in 0..3 {
        runtime.send(&troupe, Job { n })?;
    }
    let current = status(&runtime, &troupe, TroupeControl::Status).await;
    assert!(current.workers >= 1);

    runtime.stop(&troupe).await?;
    assert_eq!(runtime.actor_count(), 0);

    runtime.shutdown_all().await
}
