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

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use volley_core::config::{HomingConfig, MIN_INTERVAL};
use volley_core::lane::{Lane, LaneKind};
use volley_core::physics::{ActuationError, HostServices, RigidBodyHandle};

use super::{HomingPhase, HomingTask};
use crate::launch_lane::homing_impulse;
use crate::targeting_lane::FirstHitTargetingLane;

/// Steers live objects toward the first qualifying target along their probe.
#[derive(Debug)]
pub struct HomingLane {
    interval: Duration,
    force: f32,
    targeting: FirstHitTargetingLane,
    impulses_applied: AtomicU64,
    actuation_failures: AtomicU64,
}

impl HomingLane {
    /// Creates a lane ticking every `interval` with impulses of `force`.
    ///
    /// Intervals below [`MIN_INTERVAL`] are raised to it; a validated config
    /// never hits that path.
    pub fn new(interval: Duration, force: f32, targeting: FirstHitTargetingLane) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            force,
            targeting,
            impulses_applied: AtomicU64::new(0),
            actuation_failures: AtomicU64::new(0),
        }
    }

    /// Creates a lane from the homing section of the dispenser config.
    pub fn from_config(config: &HomingConfig) -> Self {
        Self::new(
            config.interval(),
            config.force,
            FirstHitTargetingLane::from_config(config),
        )
    }

    /// Time between two ticks of the same object.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Homing impulses the host accepted so far.
    pub fn impulses_applied(&self) -> u64 {
        self.impulses_applied.load(Ordering::Relaxed)
    }

    /// Homing impulses the host rejected so far.
    pub fn actuation_failures(&self) -> u64 {
        self.actuation_failures.load(Ordering::Relaxed)
    }

    /// Starts homing `handle`. The first tick fires one interval from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self: &Arc<Self>, handle: RigidBodyHandle, services: HostServices) -> HomingTask {
        let lane = Arc::clone(self);
        let started = Arc::new(AtomicBool::new(false));
        let polled = Arc::clone(&started);
        let join = tokio::spawn(async move {
            polled.store(true, Ordering::Release);
            let mut ticker = time::interval_at(Instant::now() + lane.interval, lane.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if lane.tick(handle, &services).await == HomingPhase::Terminated {
                    break;
                }
            }
            log::debug!("Homing for {handle} terminated: handle no longer valid.");
        });
        HomingTask::new(handle, join, started)
    }

    /// Runs one homing step for `handle` and reports the resulting phase.
    pub async fn tick(&self, handle: RigidBodyHandle, services: &HostServices) -> HomingPhase {
        let Some(position) = services.bodies.body_position(handle) else {
            return HomingPhase::Terminated;
        };

        let Some(target) = self.targeting.acquire(
            services.query.as_ref(),
            services.bodies.as_ref(),
            position,
            handle,
        ) else {
            log::trace!("Homing {handle}: no target in sight.");
            return HomingPhase::Active;
        };

        let Some(impulse) = homing_impulse(position, target.position, self.force) else {
            return HomingPhase::Active;
        };

        match services.actuator.apply(handle, impulse).await {
            Ok(()) => {
                self.impulses_applied.fetch_add(1, Ordering::Relaxed);
                log::trace!("Homing {handle} toward {} with {impulse}.", target.body);
                HomingPhase::Active
            }
            Err(ActuationError::HandleInvalid(_)) => HomingPhase::Terminated,
            Err(e) => {
                self.actuation_failures.fetch_add(1, Ordering::Relaxed);
                log::warn!("Failed to apply homing impulse to {handle}: {e}");
                HomingPhase::Active
            }
        }
    }
}

impl Lane for HomingLane {
    fn strategy_name(&self) -> &'static str {
        "PeriodicImpulse"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Homing
    }
}
