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

//! # Physics Host Contracts
//!
//! Types and capability traits through which the dispenser talks to the
//! simulation host. The host owns every body; this side only ever holds
//! [`RigidBodyHandle`]s, which may go stale at any time without notice.

mod error;
mod host;

pub use error::*;
pub use host::*;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::{Quat, Vec3};

/// Opaque handle to a rigid body owned by the physics host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RigidBodyHandle(pub u64);

impl fmt::Display for RigidBodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Identity of a scene object. A physics body is one of its optional
/// components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Defines the motion mode of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    /// Responds to forces and collisions.
    Dynamic,
    /// Fixed in place, does not move.
    Static,
    /// Controlled by the user, not by forces.
    Kinematic,
}

/// A ray used for line-of-sight probes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Starting point of the ray.
    pub origin: Vec3,
    /// Direction of the ray. Hosts normalize it before casting.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Returns the point at `distance` along the normalized direction.
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction.normalize() * distance
    }
}

/// A single ray hit, as reported by a [`SpatialQuery`] host.
///
/// The flags describe the object that owns the hit collider, captured at cast
/// time, so target qualification is a pure function of this value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The scene object owning the hit collider.
    pub object: ObjectId,
    /// The object's rigid body, if it carries one.
    pub body: Option<RigidBodyHandle>,
    /// Whether the object carries a character/agent marker.
    pub is_character: bool,
    /// World-space point where the ray entered the collider.
    pub point: Vec3,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
}

/// A request for the host to instantiate a body from a template.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// Name of the resource/template to instantiate.
    pub template: String,
    /// Initial world position.
    pub position: Vec3,
    /// Initial orientation.
    pub orientation: Quat,
    /// Initial linear velocity.
    pub initial_velocity: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_point_at_normalizes_direction() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(ray.point_at(2.0), Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(RigidBodyHandle(7).to_string(), "body#7");
        assert_eq!(ObjectId(3).to_string(), "object#3");
    }
}
