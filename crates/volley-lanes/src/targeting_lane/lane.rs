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

use volley_core::config::HomingConfig;
use volley_core::lane::{Lane, LaneKind};
use volley_core::math::Vec3;
use volley_core::physics::{BodyHost, Ray, RaycastHit, RigidBodyHandle, SpatialQuery};

/// A resolved homing target. Never stored; recomputed on every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// The target's rigid body.
    pub body: RigidBodyHandle,
    /// The body's position at acquisition time.
    pub position: Vec3,
}

/// Returns `true` if the hit object has a rigid body and a character marker.
pub fn is_qualifying_target(hit: &RaycastHit) -> bool {
    hit.body.is_some() && hit.is_character
}

/// Returns the first qualifying hit, in the order the host produced them.
pub fn select_target<I>(hits: I) -> Option<RaycastHit>
where
    I: IntoIterator<Item = RaycastHit>,
{
    hits.into_iter().find(is_qualifying_target)
}

/// Targeting strategy that takes the first qualifying hit along the probe.
#[derive(Debug, Clone)]
pub struct FirstHitTargetingLane {
    probe_direction: Vec3,
    probe_range: f32,
    max_hits: usize,
}

impl FirstHitTargetingLane {
    /// Creates a lane probing along `probe_direction` up to `probe_range`.
    pub fn new(probe_direction: Vec3, probe_range: f32, max_hits: usize) -> Self {
        Self {
            probe_direction: probe_direction.normalize(),
            probe_range,
            max_hits,
        }
    }

    /// Creates a lane from the homing section of the dispenser config.
    pub fn from_config(config: &HomingConfig) -> Self {
        Self::new(config.probe_direction, config.probe_range, config.max_hits)
    }

    /// The probe ray for an object at `origin`.
    pub fn probe(&self, origin: Vec3) -> Ray {
        Ray::new(origin, self.probe_direction)
    }

    /// Probes from `origin` and resolves the winning hit to a [`Target`].
    ///
    /// Hits on `prober` itself are skipped. A winning hit whose body can no
    /// longer be resolved yields `None`, exactly like an empty probe.
    pub fn acquire(
        &self,
        query: &dyn SpatialQuery,
        bodies: &dyn BodyHost,
        origin: Vec3,
        prober: RigidBodyHandle,
    ) -> Option<Target> {
        let hits = query.cast_ray(&self.probe(origin), self.probe_range, self.max_hits);
        let hit = select_target(hits.into_iter().filter(|hit| hit.body != Some(prober)))?;
        let body = hit.body?;
        let position = bodies.body_position(body)?;
        Some(Target { body, position })
    }
}

impl Lane for FirstHitTargetingLane {
    fn strategy_name(&self) -> &'static str {
        "FirstQualifyingHit"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Targeting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use volley_core::math::Quat;
    use volley_core::physics::{BodyType, HandleInvalid, ObjectId};

    fn hit(object: u64, body: Option<u64>, is_character: bool) -> RaycastHit {
        RaycastHit {
            object: ObjectId(object),
            body: body.map(RigidBodyHandle),
            is_character,
            point: Vec3::ZERO,
            distance: object as f32,
        }
    }

    /// Host returning canned hits and recording every probe.
    struct CannedWorld {
        hits: Vec<RaycastHit>,
        positions: Vec<(RigidBodyHandle, Vec3)>,
        probes: Mutex<Vec<(Ray, f32, usize)>>,
    }

    impl SpatialQuery for CannedWorld {
        fn cast_ray(&self, ray: &Ray, max_distance: f32, max_hits: usize) -> Vec<RaycastHit> {
            self.probes.lock().unwrap().push((*ray, max_distance, max_hits));
            self.hits.iter().copied().take(max_hits).collect()
        }
    }

    impl BodyHost for CannedWorld {
        fn find_rigid_body(&self, _object: ObjectId) -> Option<RigidBodyHandle> {
            None
        }

        fn body_transform(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
            self.positions
                .iter()
                .find(|(h, _)| *h == handle)
                .map(|(_, p)| (*p, Quat::IDENTITY))
        }

        fn set_motion_type(&self, handle: RigidBodyHandle, _: BodyType) -> Result<(), HandleInvalid> {
            Err(HandleInvalid(handle))
        }

        fn destroy(&self, handle: RigidBodyHandle) -> Result<(), HandleInvalid> {
            Err(HandleInvalid(handle))
        }

        fn has_template(&self, _template: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_first_qualifying_hit_wins() {
        let hits = vec![
            hit(1, None, false),    // A: no body
            hit(2, Some(20), false), // B: body, no marker
            hit(3, Some(30), true), // C: qualifies
            hit(4, Some(40), true), // D: qualifies, but later
        ];
        let selected = select_target(hits).unwrap();
        assert_eq!(selected.object, ObjectId(3));
    }

    #[test]
    fn test_marker_without_body_does_not_qualify() {
        assert!(!is_qualifying_target(&hit(1, None, true)));
        assert!(select_target(vec![hit(1, None, true), hit(2, Some(2), false)]).is_none());
        assert!(select_target(Vec::new()).is_none());
    }

    #[test]
    fn test_acquire_probes_forward_with_configured_limits() {
        let world = CannedWorld {
            hits: vec![hit(3, Some(30), true)],
            positions: vec![(RigidBodyHandle(30), Vec3::new(0.0, 0.0, -8.0))],
            probes: Mutex::new(Vec::new()),
        };
        let lane = FirstHitTargetingLane::new(Vec3::new(0.0, 0.0, -2.0), 20.0, 10);

        let target = lane
            .acquire(&world, &world, Vec3::new(0.0, 1.0, 0.0), RigidBodyHandle(99))
            .unwrap();
        assert_eq!(target.body, RigidBodyHandle(30));
        assert_eq!(target.position, Vec3::new(0.0, 0.0, -8.0));

        let probes = world.probes.lock().unwrap();
        assert_eq!(probes.len(), 1);
        let (ray, range, max_hits) = probes[0];
        assert_eq!(ray.origin, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(ray.direction, Vec3::FORWARD);
        assert_eq!(range, 20.0);
        assert_eq!(max_hits, 10);
    }

    #[test]
    fn test_acquire_skips_the_prober_itself() {
        let world = CannedWorld {
            hits: vec![hit(9, Some(99), true), hit(3, Some(30), true)],
            positions: vec![
                (RigidBodyHandle(99), Vec3::ZERO),
                (RigidBodyHandle(30), Vec3::new(1.0, 0.0, 0.0)),
            ],
            probes: Mutex::new(Vec::new()),
        };
        let lane = FirstHitTargetingLane::new(Vec3::FORWARD, 20.0, 10);
        let target = lane
            .acquire(&world, &world, Vec3::ZERO, RigidBodyHandle(99))
            .unwrap();
        assert_eq!(target.body, RigidBodyHandle(30));
    }

    #[test]
    fn test_unresolvable_target_is_no_target() {
        let world = CannedWorld {
            hits: vec![hit(3, Some(30), true)],
            positions: Vec::new(),
            probes: Mutex::new(Vec::new()),
        };
        let lane = FirstHitTargetingLane::new(Vec3::FORWARD, 20.0, 10);
        assert!(lane
            .acquire(&world, &world, Vec3::ZERO, RigidBodyHandle(1))
            .is_none());
    }
}
