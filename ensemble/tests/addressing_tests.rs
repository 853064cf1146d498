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

use std::collections::HashSet;
use std::time::Duration;

use ensemble::prelude::*;
use ensemble_test::prelude::*;

use crate::setup::actors::Leaf;
use crate::setup::messages::{Ping, Pong};
use crate::setup::{initialize_tracing, launch};

mod setup;

fn echo() -> ActorType<Leaf> {
    let mut echo = ActorDefinition::<Leaf>::new("echo");
    echo.on::<Ping>(|_actor, ctx| {
        let _ = ctx.reply(Pong);
        Reply::ready()
    });
    echo.register()
}

#[ensemble_test]
async fn test_unissued_address_is_malformed() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();

    let result = runtime.send(&Address::default(), Ping);
    assert!(matches!(result, Err(MessageError::MalformedAddress(_))));

    let result = runtime.ask(&Address::default(), Ping, Duration::from_millis(50)).await;
    assert!(matches!(result, Err(MessageError::MalformedAddress(_))));

    runtime.shutdown_all().await
}

#[ensemble_test]
async fn test_address_from_another_runtime_is_rejected() -> anyhow::Result<()> {
    initialize_tracing();
    let home = launch();
    let away = launch();

    let address = away.create_actor(&echo(), ActorConfig::default())?;
    match home.send(&address, Ping) {
        Err(MessageError::ForeignAddress {
            address: rejected,
            expected_system,
        }) => {
            assert_eq!(rejected, address);
            assert_ne!(expected_system, rejected.system_id());
            assert_eq!(expected_system, home.address().system_id());
        }
        other => panic!("expected ForeignAddress, got {other:?}"),
    }
    assert!(away.send(&address, Ping).is_ok());

    home.shutdown_all().await?;
    away.shutdown_all().await
}

#[ensemble_test]
async fn test_send_to_exited_actor_is_not_an_error() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();

    let address = runtime.create_actor(&echo(), ActorConfig::default())?;
    runtime.stop(&address).await?;
    assert!(!runtime.is_alive(&address));

    runtime.send(&address, Ping)?;
    let started = std::time::Instant::now();
    let reply = runtime.ask(&address, Ping, Duration::from_secs(5)).await?;
    assert!(reply.is_none());
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "a dropped request resolves without waiting for the timeout"
    );

    runtime.shutdown_all().await
}

/// Addresses compare by identity, not by name, and work as map keys after
/// the actor is gone.
#[ensemble_test]
async fn test_addresses_are_distinct_and_hashable() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();
    let echo = echo();

    let first = runtime.create_actor(&echo, ActorConfig::new_with_name("twin"))?;
    let second = runtime.create_actor(&echo, ActorConfig::new_with_name("twin"))?;
    assert_ne!(first, second);
    assert!(first.name().starts_with("twin"));
    assert!(second.name().starts_with("twin"));
    assert_ne!(first.to_string(), second.to_string());
    assert!(first.is_issued());

    let mut seen = HashSet::new();
    seen.insert(first.clone());
    seen.insert(second.clone());
    seen.insert(first.clone());
    assert_eq!(seen.len(), 2);

    runtime.stop(&first).await?;
    assert!(seen.contains(&first));

    runtime.shutdown_all().await
}

#[ensemble_test]
async fn test_ask_returns_the_reply_envelope() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();

    let address = runtime.create_actor(&echo(), ActorConfig::default())?;
    let reply = runtime
        .ask_default(&address, Ping)
        .await?
        .expect("echo replies");
    assert!(reply.is::<Pong>());
    assert_eq!(reply.sender(), &address);

    runtime.shutdown_all().await
}

/// Without a name in the configuration the actor type's name is used.
#[ensemble_test]
async fn test_actor_name_falls_back_to_type_name() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = launch();

    let address = runtime.create_actor(&echo(), ActorConfig::default())?;
    assert!(address.name().starts_with("echo"));

    runtime.shutdown_all().await
}
