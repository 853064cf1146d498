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

use ensemble::prelude::*;

use crate::setup::messages::{ChildSpawned, SpawnChild};
use crate::setup::Log;

#[ensemble_actor]
pub struct Leaf;

#[ensemble_actor]
pub struct Supervisor;

#[ensemble_actor]
pub struct Observer;

#[ensemble_actor]
pub struct Crew {
    pub handled: u32,
}

/// A supervisor definition that creates a `child` for every [`SpawnChild`]
/// and replies with [`ChildSpawned`].
pub fn supervisor<C: Default + Send + Debug + 'static>(
    name: &str,
    child: &ActorType<C>,
) -> ActorDefinition<Supervisor> {
    let child = child.clone();
    let mut definition = ActorDefinition::<Supervisor>::new(name);
    definition.on::<SpawnChild>(move |actor, ctx| {
        match actor.create_child(&child, ActorConfig::new_with_name(ctx.message().name.clone())) {
            Ok(address) => {
                let _ = ctx.reply(ChildSpawned(address));
            }
            Err(e) => tracing::error!("Failed to create child: {e}"),
        }
        Reply::ready()
    });
    definition
}

/// A child type that records every exit request it receives.
pub fn recording_leaf(name: &str, log: &Log) -> ActorType<Leaf> {
    let log = log.clone();
    let mut definition = ActorDefinition::<Leaf>::new(name);
    definition.on::<ExitRequest>(move |actor, _ctx| {
        log.lock().push(format!("exit:{}", actor.name()));
        Reply::ready()
    });
    definition.register()
}

/// Asks `supervisor` to create a child named `name` and returns its address.
pub async fn spawn_child(runtime: &ActorRuntime, supervisor: &Address, name: &str) -> Address {
    let reply = runtime
        .ask(
            supervisor,
            SpawnChild {
                name: name.to_string(),
            },
            std::time::Duration::from_secs(2),
        )
        .await
        .expect("supervisor address is valid")
        .expect("supervisor replied");
    reply
        .into_message::<ChildSpawned>()
        .expect("reply is ChildSpawned")
        .0
}
