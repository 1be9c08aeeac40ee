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

//! Recording in-memory host shared by the agent integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;
use volley_core::config::{DispenserConfig, ImpulseRange};
use volley_core::math::{Quat, Vec3};
use volley_core::physics::{
    ActuationError, BodyHost, BodyType, CreationError, HandleInvalid, HostServices,
    ImpulseActuator, ObjectFactory, ObjectId, Ray, RaycastHit, RigidBodyHandle, SpatialQuery,
    SpawnRequest,
};

pub const TEMPLATE: &str = "Ball";
pub const DISPENSER: ObjectId = ObjectId(1);

/// One host call, in the order the host saw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCall {
    Created(RigidBodyHandle),
    MadeDynamic(RigidBodyHandle),
    /// Recorded whether or not the handle was still valid.
    Impulse(RigidBodyHandle, Vec3),
    Destroyed(RigidBodyHandle),
}

#[derive(Default)]
struct HostState {
    next_handle: u64,
    positions: HashMap<RigidBodyHandle, Vec3>,
    scene: HashMap<ObjectId, RigidBodyHandle>,
    targets: Vec<(ObjectId, RigidBodyHandle)>,
    templates: HashSet<String>,
    creation_script: VecDeque<Result<(), CreationError>>,
    rejected_impulses: HashSet<RigidBodyHandle>,
    initial_velocities: HashMap<RigidBodyHandle, Vec3>,
    calls: Vec<(Instant, HostCall)>,
}

impl HostState {
    fn new_body(&mut self, position: Vec3) -> RigidBodyHandle {
        self.next_handle += 1;
        let handle = RigidBodyHandle(self.next_handle);
        self.positions.insert(handle, position);
        handle
    }

    fn record(&mut self, call: HostCall) {
        self.calls.push((Instant::now(), call));
    }
}

/// Bodies never move; every target is a character visible from anywhere.
#[derive(Default)]
pub struct RecordingHost {
    state: Mutex<HostState>,
}

impl RecordingHost {
    /// A host knowing [`TEMPLATE`], with [`DISPENSER`] at the origin.
    pub fn new() -> Arc<Self> {
        let host = Self::default();
        {
            let mut state = host.state.lock().unwrap();
            state.templates.insert(TEMPLATE.to_string());
            let body = state.new_body(Vec3::ZERO);
            state.scene.insert(DISPENSER, body);
        }
        Arc::new(host)
    }

    pub fn services(self: &Arc<Self>) -> HostServices {
        HostServices::from_host(Arc::clone(self))
    }

    pub fn dispenser_body(&self) -> RigidBodyHandle {
        self.state.lock().unwrap().scene[&DISPENSER]
    }

    /// Adds a character at `position`.
    pub fn add_target(&self, object: ObjectId, position: Vec3) -> RigidBodyHandle {
        let mut state = self.state.lock().unwrap();
        let body = state.new_body(position);
        state.scene.insert(object, body);
        state.targets.push((object, body));
        body
    }

    /// Outcomes for the next creations; once exhausted, creations succeed.
    pub fn script_creations(&self, outcomes: impl IntoIterator<Item = Result<(), CreationError>>) {
        self.state.lock().unwrap().creation_script.extend(outcomes);
    }

    pub fn reject_impulses_on(&self, handle: RigidBodyHandle) {
        self.state.lock().unwrap().rejected_impulses.insert(handle);
    }

    pub fn calls(&self) -> Vec<(Instant, HostCall)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn created(&self) -> Vec<(Instant, RigidBodyHandle)> {
        self.filter(|call| match call {
            HostCall::Created(h) => Some(h),
            _ => None,
        })
    }

    pub fn destroyed(&self) -> Vec<(Instant, RigidBodyHandle)> {
        self.filter(|call| match call {
            HostCall::Destroyed(h) => Some(h),
            _ => None,
        })
    }

    /// Velocity the object was requested with at creation.
    pub fn initial_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.state.lock().unwrap().initial_velocities.get(&handle).copied()
    }

    /// Current position of a live body.
    pub fn position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.state.lock().unwrap().positions.get(&handle).copied()
    }

    pub fn impulses_on(&self, handle: RigidBodyHandle) -> Vec<(Instant, Vec3)> {
        self.filter(|call| match call {
            HostCall::Impulse(h, impulse) if h == handle => Some(impulse),
            _ => None,
        })
    }

    fn filter<T>(&self, f: impl Fn(HostCall) -> Option<T>) -> Vec<(Instant, T)> {
        self.calls()
            .into_iter()
            .filter_map(|(at, call)| f(call).map(|v| (at, v)))
            .collect()
    }
}

#[async_trait]
impl ObjectFactory for RecordingHost {
    async fn create(&self, request: SpawnRequest) -> Result<RigidBodyHandle, CreationError> {
        let mut state = self.state.lock().unwrap();
        if !state.templates.contains(&request.template) {
            return Err(CreationError::UnknownTemplate(request.template));
        }
        state.creation_script.pop_front().unwrap_or(Ok(()))?;
        let handle = state.new_body(request.position);
        state.initial_velocities.insert(handle, request.initial_velocity);
        state.record(HostCall::Created(handle));
        Ok(handle)
    }
}

#[async_trait]
impl ImpulseActuator for RecordingHost {
    async fn apply(&self, handle: RigidBodyHandle, impulse: Vec3) -> Result<(), ActuationError> {
        let mut state = self.state.lock().unwrap();
        state.record(HostCall::Impulse(handle, impulse));
        if !state.positions.contains_key(&handle) {
            return Err(HandleInvalid(handle).into());
        }
        if state.rejected_impulses.contains(&handle) {
            return Err(ActuationError::Rejected("body is asleep".into()));
        }
        Ok(())
    }
}

impl SpatialQuery for RecordingHost {
    fn cast_ray(&self, ray: &Ray, max_distance: f32, max_hits: usize) -> Vec<RaycastHit> {
        let state = self.state.lock().unwrap();
        let mut hits: Vec<RaycastHit> = state
            .targets
            .iter()
            .filter_map(|(object, body)| {
                let point = *state.positions.get(body)?;
                let distance = point.distance(ray.origin);
                (distance <= max_distance).then_some(RaycastHit {
                    object: *object,
                    body: Some(*body),
                    is_character: true,
                    point,
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(max_hits);
        hits
    }
}

impl BodyHost for RecordingHost {
    fn find_rigid_body(&self, object: ObjectId) -> Option<RigidBodyHandle> {
        self.state.lock().unwrap().scene.get(&object).copied()
    }

    fn body_transform(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        let state = self.state.lock().unwrap();
        state.positions.get(&handle).map(|p| (*p, Quat::IDENTITY))
    }

    fn set_motion_type(&self, handle: RigidBodyHandle, _: BodyType) -> Result<(), HandleInvalid> {
        let mut state = self.state.lock().unwrap();
        if !state.positions.contains_key(&handle) {
            return Err(HandleInvalid(handle));
        }
        state.record(HostCall::MadeDynamic(handle));
        Ok(())
    }

    fn destroy(&self, handle: RigidBodyHandle) -> Result<(), HandleInvalid> {
        let mut state = self.state.lock().unwrap();
        if state.positions.remove(&handle).is_none() {
            return Err(HandleInvalid(handle));
        }
        state.record(HostCall::Destroyed(handle));
        Ok(())
    }

    fn has_template(&self, template: &str) -> bool {
        self.state.lock().unwrap().templates.contains(template)
    }
}

/// Dispenser config used by most tests: fixed launch impulse of 500, ttl
/// 10 s, homing every 100 ms.
pub fn dispenser_config() -> DispenserConfig {
    DispenserConfig {
        template: Some(TEMPLATE.to_string()),
        launch_impulse: ImpulseRange::fixed(500.0),
        ..DispenserConfig::default()
    }
}
