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

use ensemble::prelude::*;

#[ensemble_message]
pub struct Ping;

#[ensemble_message]
pub struct Pong;

/// A message no actor in the tests handles.
#[ensemble_message]
pub struct Unknown;

#[ensemble_message]
pub struct SpawnChild {
    pub name: String,
}

#[ensemble_message]
pub struct ChildSpawned(pub Address);

/// Asks an observer to send an exit request to the wrapped address.
#[ensemble_message]
pub struct Kick(pub Address);

#[ensemble_message]
pub struct Greeting {
    pub text: String,
}

#[ensemble_message]
pub struct Job {
    pub n: u32,
}

#[ensemble_message]
pub struct JobDone {
    pub n: u32,
}

/// Base of the `Event` message family.
#[ensemble_message]
pub struct Event {
    pub source: String,
}

/// A kind of [`Event`].
#[ensemble_message]
pub struct Alert {
    pub source: String,
    pub level: u8,
}

impl From<Alert> for Event {
    fn from(alert: Alert) -> Self {
        Self {
            source: alert.source,
        }
    }
}
