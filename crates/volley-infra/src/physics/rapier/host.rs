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

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use volley_core::math::{Quat, Vec3};
use volley_core::physics::{
    ActuationError, BodyHost, BodyType, CreationError, HandleInvalid, ImpulseActuator,
    ObjectFactory, ObjectId, Ray, RaycastHit, RigidBodyHandle, SpatialQuery, SpawnRequest,
};

use super::RapierScene;
use crate::throttle::CreationThrottle;

/// Thread-safe host over a shared [`RapierScene`].
///
/// Clones share the same scene, so the simulation loop and the dispenser
/// can hold their own copies.
#[derive(Debug, Clone)]
pub struct RapierHost {
    scene: Arc<Mutex<RapierScene>>,
    throttle: Option<Arc<Mutex<CreationThrottle>>>,
}

impl RapierHost {
    /// Wraps `scene` without any creation limit.
    pub fn new(scene: RapierScene) -> Self {
        Self {
            scene: Arc::new(Mutex::new(scene)),
            throttle: None,
        }
    }

    /// Rejects creations with [`CreationError::RateLimited`] beyond the
    /// throttle's budget.
    pub fn with_throttle(mut self, throttle: CreationThrottle) -> Self {
        self.throttle = Some(Arc::new(Mutex::new(throttle)));
        self
    }

    /// Locks the scene, recovering from a poisoned lock.
    pub fn scene(&self) -> MutexGuard<'_, RapierScene> {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&self, dt: f32) {
        self.scene().step(dt);
    }

    fn admit_creation(&self) -> bool {
        match &self.throttle {
            Some(throttle) => throttle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .try_acquire(),
            None => true,
        }
    }
}

#[async_trait]
impl ObjectFactory for RapierHost {
    async fn create(&self, request: SpawnRequest) -> Result<RigidBodyHandle, CreationError> {
        if !self.admit_creation() {
            return Err(CreationError::RateLimited);
        }
        let handle = self.scene().spawn(&request)?;
        log::debug!("Rapier host created {handle} from '{}'.", request.template);
        Ok(handle)
    }
}

#[async_trait]
impl ImpulseActuator for RapierHost {
    async fn apply(&self, handle: RigidBodyHandle, impulse: Vec3) -> Result<(), ActuationError> {
        if !impulse.is_finite() {
            return Err(ActuationError::Rejected(format!(
                "non-finite impulse {impulse}"
            )));
        }
        self.scene().apply_impulse(handle, impulse)?;
        Ok(())
    }
}

impl SpatialQuery for RapierHost {
    fn cast_ray(&self, ray: &Ray, max_distance: f32, max_hits: usize) -> Vec<RaycastHit> {
        self.scene().cast_ray(ray, max_distance, max_hits)
    }
}

impl BodyHost for RapierHost {
    fn find_rigid_body(&self, object: ObjectId) -> Option<RigidBodyHandle> {
        self.scene().find_rigid_body(object)
    }

    fn body_transform(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        self.scene().body_transform(handle)
    }

    fn set_motion_type(
        &self,
        handle: RigidBodyHandle,
        body_type: BodyType,
    ) -> Result<(), HandleInvalid> {
        self.scene().set_motion_type(handle, body_type)
    }

    fn destroy(&self, handle: RigidBodyHandle) -> Result<(), HandleInvalid> {
        self.scene().remove_body(handle)
    }

    fn has_template(&self, template: &str) -> bool {
        self.scene().has_template(template)
    }
}
