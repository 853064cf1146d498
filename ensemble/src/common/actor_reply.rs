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

//! Helpers for building handler return values.
//!
//! Handlers return a boxed future resolving to [`Handled`]. The future is
//! `'static`: anything it needs (an [`OutboundEnvelope`](crate::message::OutboundEnvelope),
//! a cloned address) is moved into it, while state changes happen in the
//! handler body before the future is built.
//!
//! ```ignore
//! // Synchronous handler
//! counter.on::<Increment>(|actor, ctx| {
//!     actor.model.count += ctx.message().amount;
//!     Reply::ready()
//! });
//!
//! // Asynchronous handler
//! counter.on::<Report>(|actor, ctx| {
//!     let reply = ctx.reply_envelope();
//!     let count = actor.model.count;
//!     Reply::pending(async move {
//!         let _ = reply.send(Count(count));
//!     })
//! });
//!
//! // Partially handle, then let the base actor type's handler run too
//! audited.on::<Increment>(|actor, _ctx| {
//!     actor.model.audit_log.push("increment");
//!     Reply::defer()
//! });
//! ```

use std::future::Future;

use crate::common::HandlerFuture;

/// What a handler tells the dispatcher once it has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The message is fully handled; dispatch stops here.
    Done,
    /// Continue with the next less specific handler for the same message.
    Defer,
}

/// A namespace for creating handler return types.
pub struct Reply;

impl Reply {
    /// A handler result for synchronous handlers.
    #[inline]
    #[must_use]
    pub fn ready() -> HandlerFuture {
        Box::pin(async { Handled::Done })
    }

    /// Wraps asynchronous work; the message counts as handled once it completes.
    #[inline]
    pub fn pending<F>(future: F) -> HandlerFuture
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Box::pin(async move {
            future.await;
            Handled::Done
        })
    }

    /// Hands the message on to the next less specific handler.
    #[inline]
    #[must_use]
    pub fn defer() -> HandlerFuture {
        Box::pin(async { Handled::Defer })
    }

    /// Wraps asynchronous work that decides for itself whether to defer.
    #[inline]
    pub fn decide<F>(future: F) -> HandlerFuture
    where
        F: Future<Output = Handled> + Send + 'static,
    {
        Box::pin(future)
    }
}
