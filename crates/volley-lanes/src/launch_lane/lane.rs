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

use volley_core::config::ImpulseRange;
use volley_core::lane::{Lane, LaneKind};
use volley_core::math::{SimpleRng, Vec3};

/// Recoil impulse for a trigger: `-hit_normal * strength`.
pub fn recoil_impulse(hit_normal: Vec3, strength: f32) -> Vec3 {
    -hit_normal * strength
}

/// Velocity of a shot fired from `from` straight at `to` at `speed`.
/// Returns `None` when the two positions coincide.
pub fn aimed_velocity(from: Vec3, to: Vec3, speed: f32) -> Option<Vec3> {
    let direction = (to - from).normalize();
    if direction == Vec3::ZERO {
        return None;
    }
    Some(direction * speed)
}

/// Homing impulse: unit direction from `current` to `target`, scaled by
/// `force`. Returns `None` when the two positions coincide.
pub fn homing_impulse(current: Vec3, target: Vec3, force: f32) -> Option<Vec3> {
    aimed_velocity(current, target, force)
}

/// Samples launch impulses for dispensed objects.
#[derive(Debug, Clone)]
pub struct LaunchLane {
    range: ImpulseRange,
    rng: SimpleRng,
}

impl LaunchLane {
    /// Creates a lane sampling magnitudes from `range`, seeded with `seed`.
    pub fn new(range: ImpulseRange, seed: u64) -> Self {
        Self {
            range,
            rng: SimpleRng::new(seed),
        }
    }

    /// Next launch impulse along `direction` (used as given, not normalized).
    pub fn next_impulse(&mut self, direction: Vec3) -> Vec3 {
        let magnitude = self.rng.range_f32(self.range.min, self.range.max);
        direction * magnitude
    }
}

impl Lane for LaunchLane {
    fn strategy_name(&self) -> &'static str {
        "UniformRange"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Launch
    }
}
