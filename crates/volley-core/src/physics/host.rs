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

//! Capability traits implemented by a simulation host.
//!
//! Creation and actuation are asynchronous because hosts complete them on
//! their own schedule; callers must never block waiting for them. Queries and
//! motion-mode changes are synchronous.

use async_trait::async_trait;
use std::sync::Arc;

use super::{
    ActuationError, BodyType, CreationError, HandleInvalid, ObjectId, Ray, RaycastHit,
    RigidBodyHandle, SpawnRequest,
};
use crate::math::{Quat, Vec3};

/// Creates new physics bodies from templates.
#[async_trait]
pub trait ObjectFactory: Send + Sync {
    /// Requests a new body. The returned body starts in whatever motion mode
    /// the template specifies; callers switch it to dynamic before pushing it.
    async fn create(&self, request: SpawnRequest) -> Result<RigidBodyHandle, CreationError>;
}

/// Applies linear impulses to bodies.
#[async_trait]
pub trait ImpulseActuator: Send + Sync {
    /// Applies `impulse` to the body behind `handle`.
    async fn apply(&self, handle: RigidBodyHandle, impulse: Vec3) -> Result<(), ActuationError>;
}

/// Directed ray probes against the world.
pub trait SpatialQuery: Send + Sync {
    /// Casts a fresh ray and returns at most `max_hits` hits within
    /// `max_distance`, in a deterministic host-defined order.
    fn cast_ray(&self, ray: &Ray, max_distance: f32, max_hits: usize) -> Vec<RaycastHit>;
}

/// Body bookkeeping exposed by the host.
pub trait BodyHost: Send + Sync {
    /// Returns the rigid body component of a scene object, if any.
    fn find_rigid_body(&self, object: ObjectId) -> Option<RigidBodyHandle>;

    /// Returns the current position and rotation, or `None` if the handle is
    /// no longer valid.
    fn body_transform(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)>;

    /// Switches the motion mode of a body.
    fn set_motion_type(&self, handle: RigidBodyHandle, body_type: BodyType)
        -> Result<(), HandleInvalid>;

    /// Removes a body from the simulation.
    fn destroy(&self, handle: RigidBodyHandle) -> Result<(), HandleInvalid>;

    /// Returns `true` if `template` names a resource the factory can spawn.
    fn has_template(&self, template: &str) -> bool;

    /// Convenience wrapper over [`body_transform`](Self::body_transform).
    fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.body_transform(handle).map(|(position, _)| position)
    }
}

/// Shared handles to every host capability a dispenser needs.
///
/// Cloning is cheap; each field is reference counted.
#[derive(Clone)]
pub struct HostServices {
    /// Body creation.
    pub factory: Arc<dyn ObjectFactory>,
    /// Impulse application.
    pub actuator: Arc<dyn ImpulseActuator>,
    /// Ray probes.
    pub query: Arc<dyn SpatialQuery>,
    /// Body bookkeeping.
    pub bodies: Arc<dyn BodyHost>,
}

impl HostServices {
    /// Builds the bundle from a single host implementing every capability.
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: ObjectFactory + ImpulseActuator + SpatialQuery + BodyHost + 'static,
    {
        Self {
            factory: host.clone(),
            actuator: host.clone(),
            query: host.clone(),
            bodies: host,
        }
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
