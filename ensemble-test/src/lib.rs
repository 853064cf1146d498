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

//! Testing utilities for Ensemble actors.
//!
//! ```ignore
//! use ensemble_test::prelude::*;
//!
//! #[ensemble_test]
//! async fn counts() -> anyhow::Result<()> {
//!     let runtime = Ensemble::launch();
//!     // ...
//!     runtime.shutdown_all().await
//! }
//! ```
//!
//! The attribute builds a multi-threaded Tokio runtime around the test body,
//! enters an `ensemble_test` tracing span, and fails the test if anything
//! panicked while it ran, including inside actor tasks.

pub use ensemble_test_macro::ensemble_test;

/// Re-exports for test modules.
pub mod prelude {
    pub use ensemble_test_macro::ensemble_test;
}

#[doc(hidden)]
pub mod __private {
    pub use parking_lot;
    pub use tokio;
    pub use tracing;
}
