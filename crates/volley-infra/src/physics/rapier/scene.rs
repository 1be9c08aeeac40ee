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

use std::collections::{HashMap, HashSet};

use rapier3d::parry::query::RayCast;
use rapier3d::prelude::*;
use volley_core::math::{Quat, Vec3};
use volley_core::physics::{
    BodyType, CreationError, HandleInvalid, ObjectId, Ray as ProbeRay, RaycastHit,
    RigidBodyHandle as BodyHandle, SpawnRequest,
};

use super::conversions::*;

/// Collision shape of a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateShape {
    /// Sphere with the given radius.
    Ball {
        /// Sphere radius.
        radius: f32,
    },
    /// Box with the given half extents.
    Cuboid {
        /// Half size along each axis.
        half_extents: Vec3,
    },
}

impl TemplateShape {
    fn collider(&self) -> ColliderBuilder {
        match *self {
            TemplateShape::Ball { radius } => ColliderBuilder::ball(radius),
            TemplateShape::Cuboid { half_extents: h } => ColliderBuilder::cuboid(h.x, h.y, h.z),
        }
    }
}

/// Description of a scene object or of a spawnable resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTemplate {
    /// Collision shape.
    pub shape: TemplateShape,
    /// Motion mode the body starts in. `None` means scenery with a collider
    /// but no rigid body.
    pub body_type: Option<BodyType>,
    /// Marks the object as a living target for homing.
    pub character: bool,
}

impl BodyTemplate {
    /// Kinematic ball, the usual dispensed projectile.
    pub fn projectile(radius: f32) -> Self {
        Self {
            shape: TemplateShape::Ball { radius },
            body_type: Some(BodyType::Kinematic),
            character: false,
        }
    }

    /// Fixed capsule-sized box marked as a character.
    pub fn character() -> Self {
        Self {
            shape: TemplateShape::Cuboid {
                half_extents: Vec3::new(0.4, 0.9, 0.4),
            },
            body_type: Some(BodyType::Static),
            character: true,
        }
    }

    /// Body-less obstacle.
    pub fn scenery(half_extents: Vec3) -> Self {
        Self {
            shape: TemplateShape::Cuboid { half_extents },
            body_type: None,
            character: false,
        }
    }
}

fn to_rapier_body_type(body_type: BodyType) -> RigidBodyType {
    match body_type {
        BodyType::Dynamic => RigidBodyType::Dynamic,
        BodyType::Static => RigidBodyType::Fixed,
        BodyType::Kinematic => RigidBodyType::KinematicPositionBased,
    }
}

/// A Rapier3D world plus the scene bookkeeping the dispenser needs:
/// templates, object identities and character markers.
pub struct RapierScene {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    templates: HashMap<String, BodyTemplate>,
    objects: HashMap<ObjectId, RigidBodyHandle>,
    collider_objects: HashMap<ColliderHandle, ObjectId>,
    characters: HashSet<ObjectId>,
    next_object: u64,
}

impl Default for RapierScene {
    fn default() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            templates: HashMap::new(),
            objects: HashMap::new(),
            collider_objects: HashMap::new(),
            characters: HashSet::new(),
            next_object: 0,
        }
    }
}

impl RapierScene {
    /// An empty scene with earth gravity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gravity vector.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_rapier_vec(gravity);
    }

    /// Makes `template` available to [`spawn`](Self::spawn) under `name`.
    pub fn register_template(&mut self, name: impl Into<String>, template: BodyTemplate) {
        self.templates.insert(name.into(), template);
    }

    /// Returns `true` if `name` is a registered template.
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Places an object built from `template`.
    pub fn add_object(&mut self, template: &BodyTemplate, position: Vec3) -> ObjectId {
        self.insert(template, position, Quat::IDENTITY, Vec3::ZERO).0
    }

    /// Instantiates a registered template.
    pub fn spawn(&mut self, request: &SpawnRequest) -> Result<BodyHandle, CreationError> {
        let template = *self
            .templates
            .get(&request.template)
            .ok_or_else(|| CreationError::UnknownTemplate(request.template.clone()))?;
        if template.body_type.is_none() {
            return Err(CreationError::Rejected(format!(
                "template '{}' has no rigid body",
                request.template
            )));
        }

        match self.insert(
            &template,
            request.position,
            request.orientation,
            request.initial_velocity,
        ) {
            (_, Some(handle)) => Ok(from_rapier_handle(handle)),
            (object, None) => Err(CreationError::Rejected(format!("{object} has no body"))),
        }
    }

    fn insert(
        &mut self,
        template: &BodyTemplate,
        position: Vec3,
        orientation: Quat,
        velocity: Vec3,
    ) -> (ObjectId, Option<RigidBodyHandle>) {
        self.next_object += 1;
        let object = ObjectId(self.next_object);
        let pose = to_rapier_isometry(position, orientation);
        let collider = template.shape.collider();

        let (collider, body) = match template.body_type {
            Some(body_type) => {
                let body = RigidBodyBuilder::new(to_rapier_body_type(body_type))
                    .position(pose)
                    .linvel(to_rapier_vec(velocity))
                    .build();
                let body = self.rigid_body_set.insert(body);
                let collider = self.collider_set.insert_with_parent(
                    collider.build(),
                    body,
                    &mut self.rigid_body_set,
                );
                self.objects.insert(object, body);
                (collider, Some(body))
            }
            None => (self.collider_set.insert(collider.position(pose).build()), None),
        };

        self.collider_objects.insert(collider, object);
        if template.character {
            self.characters.insert(object);
        }
        (object, body)
    }

    /// The rigid body of a scene object, if it has one.
    pub fn find_rigid_body(&self, object: ObjectId) -> Option<BodyHandle> {
        self.objects.get(&object).copied().map(from_rapier_handle)
    }

    /// Current pose of a body.
    pub fn body_transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        let body = self.rigid_body_set.get(to_rapier_handle(handle))?;
        Some((
            from_rapier_vec(body.translation()),
            from_rapier_quat(body.rotation()),
        ))
    }

    /// Current linear velocity of a body.
    pub fn body_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        let body = self.rigid_body_set.get(to_rapier_handle(handle))?;
        Some(from_rapier_vec(body.linvel()))
    }

    /// Switches the motion mode of a body.
    pub fn set_motion_type(
        &mut self,
        handle: BodyHandle,
        body_type: BodyType,
    ) -> Result<(), HandleInvalid> {
        let body = self
            .rigid_body_set
            .get_mut(to_rapier_handle(handle))
            .ok_or(HandleInvalid(handle))?;
        body.set_body_type(to_rapier_body_type(body_type), true);
        // Mass is otherwise refreshed on the next step only, and an impulse
        // applied before that would be lost.
        body.recompute_mass_properties_from_colliders(&self.collider_set);
        Ok(())
    }

    /// Applies a linear impulse at the center of mass.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> Result<(), HandleInvalid> {
        let body = self
            .rigid_body_set
            .get_mut(to_rapier_handle(handle))
            .ok_or(HandleInvalid(handle))?;
        body.apply_impulse(to_rapier_vec(impulse), true);
        Ok(())
    }

    /// Removes a body, its colliders and its scene identity.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<(), HandleInvalid> {
        let rb_handle = to_rapier_handle(handle);
        let colliders = self
            .rigid_body_set
            .get(rb_handle)
            .ok_or(HandleInvalid(handle))?
            .colliders()
            .to_vec();

        for collider in colliders {
            if let Some(object) = self.collider_objects.remove(&collider) {
                self.objects.remove(&object);
                self.characters.remove(&object);
            }
        }
        self.rigid_body_set.remove(
            rb_handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        Ok(())
    }

    /// Number of live rigid bodies.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Advances the simulation by `dt` seconds and refreshes the query
    /// structures. Ray casts see the world as of the last step.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Casts `ray` and returns up to `max_hits` hits ordered by distance,
    /// ties broken by object id.
    pub fn cast_ray(&self, ray: &ProbeRay, max_distance: f32, max_hits: usize) -> Vec<RaycastHit> {
        let direction = ray.direction.normalize();
        if direction == Vec3::ZERO || max_hits == 0 {
            return Vec::new();
        }
        let rapier_ray = Ray::new(to_rapier_point(ray.origin), to_rapier_vec(direction));

        let mut colliders = Vec::new();
        self.query_pipeline.intersections_with_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &rapier_ray,
            max_distance,
            true,
            QueryFilter::default(),
            |collider, _| {
                colliders.push(collider);
                true
            },
        );

        let mut hits: Vec<RaycastHit> = colliders
            .into_iter()
            .filter_map(|handle| self.describe_hit(handle, &rapier_ray, max_distance))
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.object.cmp(&b.object))
        });
        hits.truncate(max_hits);
        hits
    }

    fn describe_hit(
        &self,
        handle: ColliderHandle,
        ray: &Ray,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        let collider = self.collider_set.get(handle)?;
        let object = *self.collider_objects.get(&handle)?;
        let distance = collider
            .shape()
            .cast_ray(collider.position(), ray, max_distance, true)?;
        let point = ray.point_at(distance);

        Some(RaycastHit {
            object,
            body: collider.parent().map(from_rapier_handle),
            is_character: self.characters.contains(&object),
            point: Vec3::new(point.x, point.y, point.z),
            distance,
        })
    }
}

impl std::fmt::Debug for RapierScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RapierScene")
            .field("bodies", &self.rigid_body_set.len())
            .field("colliders", &self.collider_set.len())
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
