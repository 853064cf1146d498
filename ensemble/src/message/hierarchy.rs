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

use std::any::TypeId;
use std::collections::HashMap;

use tracing::{trace, warn};

use crate::traits::ActorMessage;

type Upcast = fn(&dyn ActorMessage) -> Option<Box<dyn ActorMessage>>;

#[derive(Clone, Copy)]
struct BaseLink {
    base: TypeId,
    base_name: &'static str,
    upcast: Upcast,
}

/// The explicit subtype table for message types.
///
/// `link::<Sub, Base>()` declares that `Sub` is a more specific kind of
/// `Base`. When an actor has no handler for a `Sub` message (or its handlers
/// defer), dispatch continues with the message converted to `Base`, then to
/// `Base`'s own base, and so on. Conversion goes through `Into<Base>`.
///
/// Each message type has at most one base; duplicate links and links that
/// would close a cycle are rejected.
#[derive(Clone, Default)]
pub struct MessageHierarchy {
    links: HashMap<TypeId, BaseLink>,
}

fn upcast_to<Sub, Base>(message: &dyn ActorMessage) -> Option<Box<dyn ActorMessage>>
where
    Sub: ActorMessage + Clone + Into<Base>,
    Base: ActorMessage,
{
    message
        .as_any()
        .downcast_ref::<Sub>()
        .map(|sub| Box::new(sub.clone().into()) as Box<dyn ActorMessage>)
}

impl MessageHierarchy {
    /// Declares `Base` as the base message type of `Sub`.
    ///
    /// Returns `false` (and logs) when the link is rejected.
    pub fn link<Sub, Base>(&mut self) -> bool
    where
        Sub: ActorMessage + Clone + Into<Base>,
        Base: ActorMessage,
    {
        let sub = TypeId::of::<Sub>();
        let base = TypeId::of::<Base>();
        let sub_name = std::any::type_name::<Sub>();
        let base_name = std::any::type_name::<Base>();

        if self.links.contains_key(&sub) {
            warn!("{sub_name} already has a base message type; ignoring link to {base_name}");
            return false;
        }
        if sub == base || self.ancestors(base).any(|ancestor| ancestor == sub) {
            warn!("Linking {sub_name} to {base_name} would create a cycle; ignoring");
            return false;
        }

        trace!("Linking message type {sub_name} to base {base_name}");
        self.links.insert(
            sub,
            BaseLink {
                base,
                base_name,
                upcast: upcast_to::<Sub, Base>,
            },
        );
        true
    }

    /// The base type linked to `type_id`, if any.
    #[must_use]
    pub fn base_of(&self, type_id: TypeId) -> Option<TypeId> {
        self.links.get(&type_id).map(|link| link.base)
    }

    /// Converts `message` to its base message type, if it has one.
    #[must_use]
    pub fn upcast(&self, message: &dyn ActorMessage) -> Option<Box<dyn ActorMessage>> {
        let link = self.links.get(&message.as_any().type_id())?;
        trace!("Upcasting {} to {}", message.type_name(), link.base_name);
        (link.upcast)(message)
    }

    /// Iterates the chain of base types above `type_id`, nearest first.
    pub fn ancestors(&self, type_id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(self.base_of(type_id), move |current| self.base_of(*current))
    }

    /// Whether no links have been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl std::fmt::Debug for MessageHierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.links.values().map(|link| link.base_name))
            .finish()
    }
}
