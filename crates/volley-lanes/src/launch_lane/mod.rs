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

//! Impulse math for dispensed objects.
//!
//! The triggering body is pushed back along the inverted surface normal
//! (recoil); each dispensed object is launched along the same direction with
//! a magnitude sampled from the configured range; homing impulses point from
//! the object toward its current target. Auto-fire shots use the same aiming
//! math with the configured speed.

mod lane;

pub use lane::*;
