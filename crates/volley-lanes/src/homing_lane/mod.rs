// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-object homing.
//!
//! Each live object gets its own ticker task. A tick resolves the object's
//! position, probes for a target and, if one is found, nudges the object
//! toward it. The task ends on its own once the object's handle stops
//! resolving, or immediately when its [`HomingTask`] is cancelled.
//!
//! ```text
//!  Inactive --start--> Active --(handle invalid | cancel)--> Terminated
//!                      |    ^
//!                      +----+ no target: retry next tick
//! ```

mod lane;
mod task;

pub use lane::*;
pub use task::*;
