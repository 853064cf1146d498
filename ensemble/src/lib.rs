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

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Ensemble
//!
//! Ensemble is an actor runtime kernel built on Tokio. Independent units of
//! state ("actors") communicate only through asynchronous messages, live in a
//! strict parent/child tree, and are named through opaque, runtime-issued
//! [`Address`](crate::message::Address) values.
//!
//! ## Key Concepts
//!
//! - **Addresses**: comparable, hashable handles. Sending never blocks and a
//!   send to an actor that has exited is not an error.
//! - **Actor types**: an [`ActorDefinition`](crate::actor::ActorDefinition) is
//!   a table of typed message handlers, registered once and shared by every
//!   instance. Types can derive from other types and inherit their handlers;
//!   a handler may return [`Handled::Defer`](crate::common::Handled) to let
//!   the base type's handler run as well.
//! - **Message hierarchy**: message types can be linked to a base message
//!   type, so a handler for the base also receives subtypes that have no more
//!   specific handler.
//! - **Lifecycle**: actors are created by the runtime or by other actors, and
//!   exit by processing an [`ExitRequest`](crate::message::ExitRequest).
//!   Parents learn of child termination only through
//!   [`ChildActorExited`](crate::message::ChildActorExited).
//! - **Capability gate**: actor types can require host capabilities; creation
//!   fails with `NoCompatibleHost` when no candidate host qualifies.
//! - **Transient actors**: actors that exit after a fixed delay or after a
//!   period without traffic.
//! - **Troupes**: an actor type can be served by an elastic pool of worker
//!   instances behind a single address.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ensemble::prelude::*;
//!
//! #[ensemble_message]
//! struct Ping;
//!
//! #[ensemble_message]
//! struct Pong;
//!
//! #[ensemble_actor]
//! struct Echo;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = Ensemble::launch();
//!
//!     let mut echo = ActorDefinition::<Echo>::new("echo");
//!     echo.on::<Ping>(|_actor, ctx| {
//!         let _ = ctx.reply(Pong);
//!         Reply::ready()
//!     });
//!     let echo = echo.register();
//!
//!     let address = runtime.create_actor(&echo, ActorConfig::default())?;
//!     let reply = runtime.ask(&address, Ping, std::time::Duration::from_secs(1)).await?;
//!     assert!(reply.is_some());
//!
//!     runtime.shutdown_all().await
//! }
//! ```

/// Runtime entry points, configuration, handler return helpers and shared type aliases.
pub(crate) mod common;

/// Actor definitions, managed instances and the behavior overlays.
pub(crate) mod actor;

/// Addresses, envelopes, runtime lifecycle messages and errors.
pub(crate) mod message;

/// Core traits: the message marker trait and the behavior interface.
pub(crate) mod traits;

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// ## Macros (from `ensemble-macro`)
/// *   [`ensemble_macro::ensemble_message`]: Attribute macro for defining messages.
/// *   [`ensemble_macro::ensemble_actor`]: Attribute macro for defining actor state types.
///
/// ## External Crates
/// *   [`acton_ern::*`](https://docs.rs/acton-ern): hierarchical names used for actor ids.
/// *   [`async_trait::async_trait`]: needed when implementing [`Behavior`](crate::traits::Behavior).
pub mod prelude {
    pub use ensemble_macro::*;

    pub use acton_ern::*;
    pub use async_trait::async_trait;

    pub use crate::actor::{
        requirements_satisfied, requires_capability, requires_value, ActorConfig,
        ActorDefinition, ActorType, CapabilityGate, CapabilityHost, ManagedActor, Placement,
        TransientPolicy, TroupeControl, TroupeSettings, TroupeStatus,
    };
    pub use crate::common::{
        ActorRuntime, Capabilities, CapabilityCheck, CapabilityValue, DefaultsConfig, Ensemble,
        EnsembleConfig, Handled, HandlerFuture, LimitsConfig, Reply, Requirements, TimeoutConfig,
        TroupeConfig,
    };
    pub use crate::message::{
        Address, ChildActorExited, CreateError, DeadEnvelope, Envelope, ExitRequest,
        MessageContext, MessageError, MessageHierarchy, OutboundEnvelope, PoisonMessage,
        TerminationReason, Wakeup,
    };
    pub use crate::traits::{ActorMessage, Behavior, Delivery};
}
