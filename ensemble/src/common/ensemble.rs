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

use std::sync::Arc;

use tracing::trace;

use crate::common::config::CONFIG;
use crate::common::runtime_inner::RuntimeInner;
use crate::common::{ActorRuntime, EnsembleConfig};

/// Entry point for starting an Ensemble runtime.
///
/// ```rust,ignore
/// use ensemble::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let runtime = Ensemble::launch();
///     // create actors, send messages...
///     runtime.shutdown_all().await
/// }
/// ```
///
/// Launching is synchronous and cheap. Actors can only be created from inside
/// a Tokio runtime, since each instance is a Tokio task.
#[derive(Default, Debug, Clone)]
pub struct Ensemble;

impl Ensemble {
    /// Starts a runtime with the configuration loaded from the XDG config
    /// directories (see [`EnsembleConfig::load`]).
    #[must_use]
    pub fn launch() -> ActorRuntime {
        Self::launch_with_config(CONFIG.clone())
    }

    /// Starts a runtime with an explicit configuration.
    #[must_use]
    pub fn launch_with_config(config: EnsembleConfig) -> ActorRuntime {
        trace!("Configuration: {:?}", config);
        let runtime = ActorRuntime(Arc::new(RuntimeInner::new(config)));
        trace!("Ensemble system {} launched", runtime.0.system);
        runtime
    }
}
