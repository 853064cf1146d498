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

//! Actor types, live instances and the behavior overlays between them.
//!
//! *   [`ActorDefinition`] / [`ActorType`]: the per-type handler table, built
//!     once and shared by every instance.
//! *   [`ManagedActor`]: a running instance, handed to every handler.
//! *   [`ActorConfig`]: per-creation parameters.
//! *   [`CapabilityGate`] and [`Placement`]: capability-gated placement.
//! *   [`TransientPolicy`]: self-terminating actors.
//! *   [`TroupeSettings`], [`TroupeControl`], [`TroupeStatus`]: elastic worker pools.

pub use actor_config::ActorConfig;
pub use actor_type::{ActorDefinition, ActorType};
pub use capability::{
    requirements_satisfied, requires_capability, requires_value, CapabilityGate, CapabilityHost,
    Placement,
};
pub use managed_actor::ManagedActor;
pub use transient::TransientPolicy;
pub use troupe::{TroupeControl, TroupeSettings, TroupeStatus};

pub(crate) use managed_actor::{spawn_actor, Role};
pub(crate) use troupe::{TroupeWork, TroupeWorkRejected, TroupeWorkerReady};

/// Contains the `ActorConfig` struct for actor creation.
mod actor_config;
/// Contains the handler registration table and the frozen actor type.
mod actor_type;
/// Contains capability predicates and host placement.
mod capability;
/// Contains the handler-inheritance dispatcher.
mod dispatcher;
/// Contains the `ManagedActor` struct, instance creation and its message loop.
mod managed_actor;
/// Contains the transient overlay.
mod transient;
/// Contains the troupe manager, worker and pool.
mod troupe;
