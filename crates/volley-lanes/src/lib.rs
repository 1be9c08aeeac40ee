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

//! # Volley Lanes
//!
//! Hot-path strategies used by the dispenser agent: picking a target from a
//! line-of-sight probe, computing launch and homing impulses, and running the
//! per-object homing loop.

#![warn(missing_docs)]

pub mod homing_lane;
pub mod launch_lane;
pub mod targeting_lane;

pub use homing_lane::{HomingLane, HomingPhase, HomingTask};
pub use launch_lane::LaunchLane;
pub use targeting_lane::{FirstHitTargetingLane, Target};
