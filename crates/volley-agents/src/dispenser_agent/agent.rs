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

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use volley_core::config::DispenserConfig;
use volley_core::event::{EventBus, TriggerEvent};
use volley_core::lane::Lane;
use volley_core::math::{Quat, Vec3};
use volley_core::physics::{
    ActuationError, BodyType, CreationError, HostServices, ObjectId, RigidBodyHandle,
    SpawnRequest,
};
use volley_lanes::launch_lane::{aimed_velocity, recoil_impulse};
use volley_lanes::{FirstHitTargetingLane, HomingLane, LaunchLane};

use super::{
    DispenserError, DispenserEvent, DispenserStats, LifecycleRegistry, SpawnSequence,
    StatsSnapshot,
};

/// Cloneable front end of a running [`DispenserAgent`].
#[derive(Debug, Clone)]
pub struct DispenserHandle {
    events: flume::Sender<DispenserEvent>,
    stats: Arc<DispenserStats>,
}

impl DispenserHandle {
    /// Delivers a trigger. Returns `false` once the agent has stopped.
    pub fn trigger(&self, event: TriggerEvent) -> bool {
        self.events.send(DispenserEvent::Triggered(event)).is_ok()
    }

    /// Asks the agent to destroy every live object and stop.
    pub fn shutdown(&self) -> bool {
        self.events.send(DispenserEvent::Shutdown).is_ok()
    }

    /// Current counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

/// The agent driving one dispenser.
///
/// It owns the [`LifecycleRegistry`] and is the only code that mutates it.
/// Host calls never block the loop: creations, impulses and timers are
/// spawned onto the runtime and report back as [`DispenserEvent`]s.
pub struct DispenserAgent {
    config: DispenserConfig,
    /// `Some` while the dispenser is enabled.
    template: Option<String>,
    disabled: Option<DispenserError>,
    services: HostServices,
    registry: LifecycleRegistry,
    launch: LaunchLane,
    homing: Arc<HomingLane>,
    targeting: FirstHitTargetingLane,
    shooter: Option<ObjectId>,
    /// Triggers and shutdown from [`DispenserHandle`]s.
    commands: EventBus<DispenserEvent>,
    /// Completions and timers from tasks the agent spawned.
    bus: EventBus<DispenserEvent>,
    stats: Arc<DispenserStats>,
    in_flight: usize,
    shutting_down: bool,
}

impl DispenserAgent {
    /// Creates an agent for `config` on top of the host `services`.
    ///
    /// An invalid configuration or a missing/unknown template leaves the
    /// agent disabled: the reason is logged once here and every trigger is
    /// ignored afterwards.
    pub fn new(config: DispenserConfig, services: HostServices) -> Self {
        let (template, disabled) = match Self::resolve_template(&config, &services) {
            Ok(template) => (Some(template), None),
            Err(reason) => {
                log::error!("Dispenser disabled: {reason}.");
                (None, Some(reason))
            }
        };

        let launch = LaunchLane::new(config.launch_impulse, config.rng_seed);
        let homing = Arc::new(HomingLane::from_config(&config.homing));
        if let Some(template) = &template {
            log::info!(
                "Dispenser ready: template '{template}', lanes [{}, {}], ttl {:?}, homing every {:?}.",
                launch.label(),
                homing.label(),
                config.ttl(),
                homing.interval()
            );
        }

        Self {
            registry: LifecycleRegistry::new(
                Arc::clone(&services.bodies),
                config.max_live_objects,
            ),
            targeting: FirstHitTargetingLane::from_config(&config.homing),
            config,
            template,
            disabled,
            services,
            launch,
            homing,
            shooter: None,
            commands: EventBus::new(),
            bus: EventBus::new(),
            stats: Arc::new(DispenserStats::default()),
            in_flight: 0,
            shutting_down: false,
        }
    }

    fn resolve_template(
        config: &DispenserConfig,
        services: &HostServices,
    ) -> Result<String, DispenserError> {
        config.validate()?;
        let template = config
            .template
            .clone()
            .ok_or(DispenserError::MissingTemplate)?;
        if !services.bodies.has_template(&template) {
            return Err(DispenserError::UnknownTemplate(template));
        }
        Ok(template)
    }

    /// Sets the object auto-fire shoots from. Without one, the auto-fire
    /// section of the config is ignored.
    pub fn with_shooter(mut self, shooter: ObjectId) -> Self {
        self.shooter = Some(shooter);
        self
    }

    /// `true` when triggers will dispense objects.
    pub fn is_enabled(&self) -> bool {
        self.template.is_some()
    }

    /// Why the dispenser is disabled, if it is.
    pub fn disabled_reason(&self) -> Option<&DispenserError> {
        self.disabled.as_ref()
    }

    /// A handle for delivering triggers and stopping the agent.
    pub fn handle(&self) -> DispenserHandle {
        DispenserHandle {
            events: self.commands.sender(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Current counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// The registry of live objects.
    pub fn registry(&self) -> &LifecycleRegistry {
        &self.registry
    }

    /// The homing lane shared by every live object.
    pub fn homing_lane(&self) -> &Arc<HomingLane> {
        &self.homing
    }

    /// Spawns [`run`](Self::run) onto the current tokio runtime.
    pub fn spawn(self) -> (DispenserHandle, JoinHandle<()>) {
        let handle = self.handle();
        (handle, tokio::spawn(self.run()))
    }

    /// Runs the event loop until a [`DispenserEvent::Shutdown`] has been
    /// processed and no creation is still in flight.
    ///
    /// Dropping every [`DispenserHandle`] counts as a shutdown.
    pub async fn run(mut self) {
        // Only handles may keep the command bus open.
        let commands = std::mem::take(&mut self.commands).receiver().clone();
        let internal = self.bus.receiver().clone();
        let mut commands_open = true;
        let auto_fire = self.start_auto_fire();
        log::debug!("Dispenser event loop started.");

        loop {
            let event = tokio::select! {
                command = commands.recv_async(), if commands_open => match command {
                    Ok(event) => event,
                    Err(_) => {
                        commands_open = false;
                        log::info!("Every dispenser handle was dropped.");
                        DispenserEvent::Shutdown
                    }
                },
                Ok(event) = internal.recv_async() => event,
            };
            if self.handle_event(event).is_break() {
                break;
            }
        }

        if let Some(ticker) = auto_fire {
            ticker.abort();
        }

        let stats = self.stats.snapshot();
        log::info!(
            "Dispenser stopped: {} spawned, {} evicted, {} throttled, {} failed.",
            stats.spawned,
            stats.evicted,
            stats.throttled,
            stats.creation_failures
        );
    }

    /// Processes one event on the loop.
    pub fn handle_event(&mut self, event: DispenserEvent) -> ControlFlow<()> {
        match event {
            DispenserEvent::Triggered(trigger) => self.on_trigger(trigger),
            DispenserEvent::SpawnCompleted { launch, result } => {
                self.on_spawn_completed(launch, result)
            }
            DispenserEvent::TtlElapsed(sequence) => self.on_ttl_elapsed(sequence),
            DispenserEvent::AutoFire => self.on_auto_fire(),
            DispenserEvent::Shutdown => self.on_shutdown(),
        }
        self.stats.set_live(self.registry.len());

        if self.shutting_down && self.in_flight == 0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn on_trigger(&mut self, trigger: TriggerEvent) {
        self.stats.record_trigger();
        if self.shutting_down {
            return;
        }
        let Some(template) = self.template.clone() else {
            log::debug!("Dispenser disabled; ignoring trigger from {}.", trigger.source);
            return;
        };

        let Some((body, position, orientation)) = self.locate(trigger.source) else {
            log::warn!(
                "Ignoring trigger: {}.",
                DispenserError::MissingRigidBody(trigger.source)
            );
            return;
        };

        self.apply_impulse(
            body,
            recoil_impulse(trigger.hit_normal, self.config.impulse_strength),
            "recoil",
        );

        let direction = trigger.recoil_direction();
        for _ in 0..self.config.objects_per_trigger {
            let launch = self.launch.next_impulse(direction);
            self.request_spawn(
                SpawnRequest {
                    template: template.clone(),
                    position,
                    orientation,
                    initial_velocity: Vec3::ZERO,
                },
                launch,
            );
        }
    }

    fn locate(&self, object: ObjectId) -> Option<(RigidBodyHandle, Vec3, Quat)> {
        let bodies = &self.services.bodies;
        let body = bodies.find_rigid_body(object)?;
        let (position, orientation) = bodies.body_transform(body)?;
        Some((body, position, orientation))
    }

    fn start_auto_fire(&self) -> Option<JoinHandle<()>> {
        let auto_fire = self.config.auto_fire?;
        self.template.as_ref()?;
        let Some(shooter) = self.shooter else {
            log::warn!("Auto-fire configured without a shooter; timer not started.");
            return None;
        };

        let period = auto_fire.interval();
        let events = self.bus.sender();
        log::info!(
            "Auto-fire from {shooter} every {period:?} at speed {}.",
            auto_fire.speed
        );
        Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if events.send(DispenserEvent::AutoFire).is_err() {
                    break;
                }
            }
        }))
    }

    fn on_auto_fire(&mut self) {
        if self.shutting_down {
            return;
        }
        let (Some(template), Some(shooter), Some(auto_fire)) =
            (self.template.clone(), self.shooter, self.config.auto_fire)
        else {
            return;
        };

        let Some((body, position, orientation)) = self.locate(shooter) else {
            log::warn!(
                "Skipping shot: {}.",
                DispenserError::MissingRigidBody(shooter)
            );
            return;
        };
        let Some(target) = self.targeting.acquire(
            self.services.query.as_ref(),
            self.services.bodies.as_ref(),
            position,
            body,
        ) else {
            log::trace!("Auto-fire: no target in sight.");
            return;
        };
        let Some(velocity) = aimed_velocity(position, target.position, auto_fire.speed) else {
            return;
        };

        self.stats.record_auto_shot();
        log::debug!("Auto-fire at {} with velocity {velocity}.", target.body);
        self.request_spawn(
            SpawnRequest {
                template,
                position,
                orientation,
                initial_velocity: velocity,
            },
            velocity,
        );
    }

    fn request_spawn(&mut self, request: SpawnRequest, launch: Vec3) {
        self.stats.record_spawn_request();
        self.in_flight += 1;

        let factory = Arc::clone(&self.services.factory);
        let events = self.bus.sender();
        tokio::spawn(async move {
            let result = factory.create(request).await;
            if events
                .send(DispenserEvent::SpawnCompleted { launch, result })
                .is_err()
            {
                log::debug!("Dispenser stopped before a creation completed.");
            }
        });
    }

    fn on_spawn_completed(&mut self, launch: Vec3, result: Result<RigidBodyHandle, CreationError>) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let handle = match result {
            Ok(handle) => handle,
            Err(CreationError::RateLimited) => {
                self.stats.record_throttled();
                log::warn!("Spawn skipped: host creation rate limit reached.");
                return;
            }
            Err(e) => {
                self.stats.record_creation_failure();
                log::error!("Failed to spawn dispensed object: {e}");
                return;
            }
        };

        if self.shutting_down {
            log::debug!("Destroying {handle}: created after shutdown.");
            if let Err(e) = self.services.bodies.destroy(handle) {
                log::debug!("{e}");
            }
            return;
        }

        if let Err(e) = self.services.bodies.set_motion_type(handle, BodyType::Dynamic) {
            log::debug!("Could not make {handle} dynamic: {e}");
        }

        let registration = self.registry.register(handle, self.config.ttl());
        if registration.displaced.is_some() {
            self.stats.record_evicted(1);
        }
        let task = self.homing.start(handle, self.services.clone());
        self.registry.attach_homing(registration.sequence, task);
        if let Some(entry) = self.registry.get(registration.sequence) {
            self.schedule_expiry(entry.sequence(), entry.expires_at());
        }
        self.apply_impulse(handle, launch, "launch");

        self.stats.record_spawned();
        log::info!(
            "Spawned {handle} ({}) with launch impulse {launch}.",
            registration.sequence
        );
    }

    fn schedule_expiry(&self, sequence: SpawnSequence, deadline: Instant) {
        let events = self.bus.sender();
        tokio::spawn(async move {
            time::sleep_until(deadline).await;
            if events.send(DispenserEvent::TtlElapsed(sequence)).is_err() {
                log::debug!("Dispenser stopped before {sequence} expired.");
            }
        });
    }

    fn apply_impulse(&self, handle: RigidBodyHandle, impulse: Vec3, kind: &'static str) {
        let actuator = Arc::clone(&self.services.actuator);
        let stats = Arc::clone(&self.stats);
        tokio::spawn(async move {
            match actuator.apply(handle, impulse).await {
                Ok(()) => log::trace!("Applied {kind} impulse {impulse} to {handle}."),
                Err(ActuationError::HandleInvalid(e)) => {
                    log::debug!("Skipped {kind} impulse: {e}.")
                }
                Err(e) => {
                    stats.record_actuation_failure();
                    log::warn!("Failed to apply {kind} impulse to {handle}: {e}");
                }
            }
        });
    }

    fn on_ttl_elapsed(&mut self, sequence: SpawnSequence) {
        if let Some(handle) = self.registry.evict_expired(sequence) {
            self.stats.record_evicted(1);
            log::debug!("{handle} reached the end of its lifetime.");
        }
    }

    fn on_shutdown(&mut self) {
        if self.shutting_down {
            return;
        }
        self.shutting_down = true;
        let removed = self.registry.clear();
        self.stats.record_evicted(removed as u64);
        log::info!(
            "Dispenser shutting down: destroyed {removed} live objects, {} creations pending.",
            self.in_flight
        );
    }
}

impl std::fmt::Debug for DispenserAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispenserAgent")
            .field("template", &self.template)
            .field("shooter", &self.shooter)
            .field("registry", &self.registry)
            .field("in_flight", &self.in_flight)
            .field("shutting_down", &self.shutting_down)
            .finish_non_exhaustive()
    }
}
