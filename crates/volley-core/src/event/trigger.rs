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

use crate::math::Vec3;
use crate::physics::ObjectId;

/// An interaction delivered by the host (e.g. a click on the dispenser).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    /// The object that was interacted with.
    pub source: ObjectId,
    /// Surface normal at the interaction point, pointing out of the surface.
    pub hit_normal: Vec3,
}

impl TriggerEvent {
    /// Creates a new trigger event.
    pub fn new(source: ObjectId, hit_normal: Vec3) -> Self {
        Self { source, hit_normal }
    }

    /// The push direction: the inverse of the surface normal.
    pub fn recoil_direction(&self) -> Vec3 {
        -self.hit_normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoil_direction_inverts_normal() {
        let event = TriggerEvent::new(ObjectId(1), Vec3::new(0.0, 1.0, 0.5));
        assert_eq!(event.recoil_direction(), Vec3::new(0.0, -1.0, -0.5));
    }
}
