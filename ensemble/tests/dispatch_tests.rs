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

use std::time::Duration;

use ensemble::prelude::*;
use ensemble_test::prelude::*;

use crate::setup::actors::{spawn_child, supervisor, Leaf, Supervisor};
use crate::setup::messages::{Alert, Event, Greeting, Ping, Pong, Unknown};
use crate::setup::{eventually, initialize_tracing, launch, new_log};

mod setup;

/// A derived type's handler runs first; returning `Defer` hands the same
/// message, with the same sender, to the base type's handler.
#[ensemble_test]
async fn test_derived_handler_defers_to_base() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    let log = new_log();

    let mut greeter = ActorDefinition::<Leaf>::new("greeter");
    let base_log = log.clone();
    greeter.on::<Greeting>(move |_actor, ctx| {
        base_log
            .lock()
            .push(format!("base:{}:{}", ctx.message().text, ctx.sender()));
        Reply::ready()
    });
    let greeter = greeter.register();

    let mut formal = ActorDefinition::derive("formal", &greeter);
    let derived_log = log.clone();
    formal.on::<Greeting>(move |_actor, ctx| {
        derived_log
            .lock()
            .push(format!("derived:{}:{}", ctx.message().text, ctx.sender()));
        Reply::defer()
    });
    let formal = formal.register();

    let address = runtime.create_actor(&formal, ActorConfig::default())?;
    runtime.send(
        &address,
        Greeting {
            text: "hello".to_string(),
        },
    )?;

    assert!(eventually(Duration::from_secs(2), || log.lock().len() == 2).await);
    let sender = runtime.address().to_string();
    assert_eq!(
        *log.lock(),
        vec![
            format!("derived:hello:{sender}"),
            format!("base:hello:{sender}"),
        ]
    );

    runtime.shutdown_all().await
}

/// Without `Defer` the derived handler fully handles the message.
#[ensemble_test]
async fn test_derived_handler_overrides_base() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    let log = new_log();

    let mut base = ActorDefinition::<Leaf>::new("base");
    let base_log = log.clone();
    base.on::<Greeting>(move |_actor, _ctx| {
        base_log.lock().push("base".to_string());
        Reply::ready()
    });
    let base = base.register();

    let mut derived = ActorDefinition::derive("derived", &base);
    let derived_log = log.clone();
    derived.on::<Greeting>(move |_actor, _ctx| {
        derived_log.lock().push("derived".to_string());
        Reply::ready()
    });
    derived.on::<Ping>(|_actor, ctx| {
        let _ = ctx.reply(Pong);
        Reply::ready()
    });
    let derived = derived.register();

    let address = runtime.create_actor(&derived, ActorConfig::default())?;
    runtime.send(
        &address,
        Greeting {
            text: "hi".to_string(),
        },
    )?;
    // A round trip after the greeting proves it has been processed.
    let reply = runtime.ask(&address, Ping, Duration::from_secs(2)).await?;
    assert!(reply.is_some_and(|reply| reply.is::<Pong>()));
    assert_eq!(*log.lock(), vec!["derived".to_string()]);

    runtime.shutdown_all().await
}

/// A handler for a base message type receives linked subtypes that have no
/// more specific handler, and a deferring subtype handler falls through to it.
#[ensemble_test]
async fn test_base_message_handler_receives_subtypes() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    assert!(runtime.link::<Alert, Event>());
    let log = new_log();

    let mut events_only = ActorDefinition::<Leaf>::new("events");
    let events_log = log.clone();
    events_only.on::<Event>(move |_actor, ctx| {
        events_log.lock().push(format!("event:{}", ctx.message().source));
        Reply::ready()
    });
    let events_only = events_only.register();

    let mut both = ActorDefinition::<Leaf>::new("both");
    let event_log = log.clone();
    both.on::<Event>(move |_actor, ctx| {
        event_log.lock().push(format!("event:{}", ctx.message().source));
        Reply::ready()
    });
    let alert_log = log.clone();
    both.on::<Alert>(move |_actor, ctx| {
        alert_log.lock().push(format!("alert:{}", ctx.message().level));
        if ctx.message().level > 5 {
            Reply::defer()
        } else {
            Reply::ready()
        }
    });
    let both = both.register();

    let first = runtime.create_actor(&events_only, ActorConfig::default())?;
    runtime.send(
        &first,
        Alert {
            source: "disk".to_string(),
            level: 1,
        },
    )?;
    assert!(eventually(Duration::from_secs(2), || log.lock().len() == 1).await);
    assert_eq!(log.lock()[0], "event:disk");
    log.lock().clear();

    let second = runtime.create_actor(&both, ActorConfig::default())?;
    runtime.send(
        &second,
        Alert {
            source: "cpu".to_string(),
            level: 2,
        },
    )?;
    runtime.send(
        &second,
        Alert {
            source: "fan".to_string(),
            level: 9,
        },
    )?;
    assert!(eventually(Duration::from_secs(2), || log.lock().len() == 3).await);
    assert_eq!(
        *log.lock(),
        vec![
            "alert:2".to_string(),
            "alert:9".to_string(),
            "event:fan".to_string(),
        ]
    );

    runtime.shutdown_all().await
}

#[ensemble_test]
async fn test_message_links_reject_cycles() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    assert!(runtime.link::<Alert, Event>());
    assert!(!runtime.link::<Alert, Event>());

    let mut hierarchy = MessageHierarchy::default();
    assert!(hierarchy.link::<Alert, Event>());
    assert!(hierarchy.base_of(std::any::TypeId::of::<Alert>()).is_some());
    Ok(())
}

/// The fallback runs for application messages nothing else handles.
#[ensemble_test]
async fn test_fallback_receives_unmatched_messages() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    let log = new_log();

    let mut lenient = ActorDefinition::<Leaf>::new("lenient");
    let fallback_log = log.clone();
    lenient.on_unhandled(move |_actor, envelope| {
        fallback_log
            .lock()
            .push(envelope.message().type_name().to_string());
        Reply::ready()
    });
    let lenient = lenient.register();

    let address = runtime.create_actor(&lenient, ActorConfig::default())?;
    runtime.send(&address, Unknown)?;
    assert!(eventually(Duration::from_secs(2), || log.lock().len() == 1).await);
    assert!(log.lock()[0].ends_with("Unknown"));
    assert!(runtime.is_alive(&address));

    runtime.shutdown_all().await
}

/// An unhandled message ends the instance: the sender gets it back as
/// poison and the parent learns of the exit with the message type as reason.
#[ensemble_test]
async fn test_unhandled_message_poisons_sender_and_notifies_parent() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    let log = new_log();

    let strict = ActorDefinition::<Leaf>::new("strict").register();
    let mut parent = supervisor("parent", &strict);
    let exit_log = log.clone();
    parent.on::<ChildActorExited>(move |_actor, ctx| {
        exit_log.lock().push(format!("{:?}", ctx.message().reason));
        Reply::ready()
    });
    let parent = runtime.create_actor(&parent.register(), ActorConfig::default())?;
    let child = spawn_child(&runtime, &parent, "strict").await;

    let reply = runtime
        .ask(&child, Unknown, Duration::from_secs(2))
        .await?
        .expect("poison comes back to the sender");
    let poison = reply
        .downcast_ref::<PoisonMessage>()
        .expect("reply is a poison message");
    assert!(poison.message::<Unknown>().is_some());
    assert_eq!(poison.intended, child);

    assert!(eventually(Duration::from_secs(2), || log.lock().len() == 1).await);
    assert!(log.lock()[0].starts_with("Unhandled("));
    assert!(log.lock()[0].contains("Unknown"));
    assert!(!runtime.is_alive(&child));
    assert!(runtime.is_alive(&parent));

    runtime.shutdown_all().await
}

/// Lifecycle messages are never faults, even with no handler at all.
#[ensemble_test]
async fn test_lifecycle_messages_are_accepted_without_handlers() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    let mut quiet = ActorDefinition::<Supervisor>::new("quiet");
    quiet.on::<Ping>(|_actor, ctx| {
        let _ = ctx.reply(Pong);
        Reply::ready()
    });
    let quiet = quiet.register();
    let address = runtime.create_actor(&quiet, ActorConfig::default())?;

    runtime.send(
        &address,
        ChildActorExited {
            child: runtime.address().clone(),
            reason: TerminationReason::Normal,
        },
    )?;
    runtime.send(&address, TroupeControl::Status)?;

    let reply = runtime.ask(&address, Ping, Duration::from_secs(2)).await?;
    assert!(reply.is_some_and(|reply| reply.is::<Pong>()));
    assert!(runtime.is_alive(&address));

    runtime.shutdown_all().await
}
