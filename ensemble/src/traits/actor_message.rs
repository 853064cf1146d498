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

use std::any::Any;
use std::fmt::Debug;

use dyn_clone::DynClone;

/// A marker trait for types that can be sent as messages between actors.
///
/// Messages must be safe to move between threads, cloneable behind a trait
/// object (the runtime clones a message when it retries a panicked handler, when
/// it upcasts it to a base message type, and when a troupe requeues work), and
/// downcastable back to their concrete type for dispatch.
///
/// A blanket implementation covers every `Clone + Debug + Send + Sync + 'static`
/// type. The [`ensemble_message`](ensemble_macro::ensemble_message) attribute adds
/// the derives.
pub trait ActorMessage: DynClone + Any + Send + Sync + Debug {
    /// Returns the message as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the message as mutable [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The Rust type name of the concrete message, used in logs and poison reports.
    fn type_name(&self) -> &'static str;
}

dyn_clone::clone_trait_object!(ActorMessage);

impl<T> ActorMessage for T
where
    T: Any + Send + Sync + Debug + DynClone + 'static,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
